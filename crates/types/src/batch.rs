//! Signed batches of transactions.

use crate::{
    batch_header_message, BatchId, KeyPair, PublicKey, Signature, Transaction, TransactionError,
    TransactionId,
};

/// Header of a batch. This is what gets signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchHeader {
    pub signer_public_key: PublicKey,

    /// Ids of the contained transactions, in order.
    pub transaction_ids: Vec<TransactionId>,
}

/// A signed group of transactions submitted as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub header: BatchHeader,
    pub header_signature: Signature,
    pub transactions: Vec<Transaction>,
}

impl Batch {
    /// Identifier derived from the header signature.
    pub fn id(&self) -> BatchId {
        BatchId::from_signature(&self.header_signature)
    }

    /// Check the batch signature, that the header lists exactly the
    /// contained transactions, and every transaction.
    pub fn verify(&self) -> bool {
        let ids_match = self.header.transaction_ids.len() == self.transactions.len()
            && self
                .header
                .transaction_ids
                .iter()
                .zip(&self.transactions)
                .all(|(id, txn)| *id == txn.id());

        ids_match
            && self
                .header
                .signer_public_key
                .verify(&batch_header_message(&self.header), &self.header_signature)
            && self.transactions.iter().all(Transaction::verify)
    }
}

/// Build and sign a batch around the given transactions.
pub fn create_batch(
    transactions: Vec<Transaction>,
    signer: &KeyPair,
) -> Result<Batch, TransactionError> {
    if transactions.is_empty() {
        return Err(TransactionError::EmptyBatch);
    }

    let header = BatchHeader {
        signer_public_key: signer.public_key(),
        transaction_ids: transactions.iter().map(Transaction::id).collect(),
    };
    let header_signature = signer.sign(&batch_header_message(&header));

    Ok(Batch {
        header,
        header_signature,
        transactions,
    })
}

/// The unit handed to a connection for a batch-submission request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchList {
    pub batches: Vec<Batch>,
}

impl BatchList {
    /// A list holding one batch.
    pub fn single(batch: Batch) -> Self {
        Self {
            batches: vec![batch],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_intkey_transaction, IntKeyVerb};

    #[test]
    fn test_create_batch() {
        let signer = KeyPair::from_seed(&[5u8; 32]);
        let txn = create_intkey_transaction(IntKeyVerb::Set, "k", 0, vec![], &signer).unwrap();
        let txn_id = txn.id();

        let batch = create_batch(vec![txn], &signer).unwrap();

        assert!(batch.verify());
        assert_eq!(batch.header.transaction_ids, vec![txn_id]);
        assert_eq!(BatchList::single(batch.clone()).batches, vec![batch]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let signer = KeyPair::from_seed(&[5u8; 32]);
        assert!(matches!(
            create_batch(vec![], &signer),
            Err(TransactionError::EmptyBatch)
        ));
    }

    #[test]
    fn test_batch_signed_by_other_key_fails() {
        let signer = KeyPair::from_seed(&[5u8; 32]);
        let txn = create_intkey_transaction(IntKeyVerb::Set, "k", 0, vec![], &signer).unwrap();
        let mut batch = create_batch(vec![txn], &signer).unwrap();
        batch.header.signer_public_key = KeyPair::from_seed(&[6u8; 32]).public_key();

        assert!(!batch.verify());
    }

    #[test]
    fn test_batch_with_extra_transaction_fails() {
        let mut batch = crate::test_utils::test_set_batch("k1");
        let other = crate::test_utils::test_set_batch("k2");
        batch.transactions.extend(other.transactions);

        assert!(!batch.verify());
    }
}
