//! Signed IntKey transactions.

use crate::{
    transaction_header_message, Hash, IntKeyPayload, IntKeyVerb, KeyPair, PublicKey, Signature,
    TransactionId, FAMILY_NAME, FAMILY_VERSION,
};
use rand::RngCore;

/// Header of a transaction. This is what gets signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionHeader {
    pub family_name: String,
    pub family_version: String,

    /// State addresses the transaction may read.
    pub inputs: Vec<String>,

    /// State addresses the transaction may write.
    pub outputs: Vec<String>,

    /// Transactions that must be committed before this one.
    pub dependencies: Vec<TransactionId>,

    /// Hash of the payload bytes.
    pub payload_hash: Hash,

    pub signer_public_key: PublicKey,
    pub batcher_public_key: PublicKey,

    /// Random nonce, so identical payloads still get distinct ids.
    pub nonce: String,
}

/// A signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub header: TransactionHeader,
    pub header_signature: Signature,
    pub payload: Vec<u8>,
}

impl Transaction {
    /// Identifier derived from the header signature.
    pub fn id(&self) -> TransactionId {
        TransactionId::from_signature(&self.header_signature)
    }

    /// Check the header signature and the payload hash.
    pub fn verify(&self) -> bool {
        Hash::from_bytes(&self.payload) == self.header.payload_hash
            && self.header.signer_public_key.verify(
                &transaction_header_message(&self.header),
                &self.header_signature,
            )
    }

    /// Decode the IntKey payload.
    pub fn intkey_payload(&self) -> Result<IntKeyPayload, TransactionError> {
        Ok(IntKeyPayload::decode(&self.payload)?)
    }
}

/// Build and sign an IntKey transaction.
///
/// The same key pair signs the transaction and is recorded as its batcher,
/// since every batch a workload submits is signed by that key too.
pub fn create_intkey_transaction(
    verb: IntKeyVerb,
    name: &str,
    value: u64,
    dependencies: Vec<TransactionId>,
    signer: &KeyPair,
) -> Result<Transaction, TransactionError> {
    let intkey = IntKeyPayload::new(verb, name, value);
    let payload = intkey.encode()?;
    let address = intkey.address();
    let public_key = signer.public_key();

    let header = TransactionHeader {
        family_name: FAMILY_NAME.to_string(),
        family_version: FAMILY_VERSION.to_string(),
        inputs: vec![address.clone()],
        outputs: vec![address],
        dependencies,
        payload_hash: Hash::from_bytes(&payload),
        signer_public_key: public_key.clone(),
        batcher_public_key: public_key,
        nonce: hex::encode(rand::rngs::OsRng.next_u64().to_le_bytes()),
    };

    let header_signature = signer.sign(&transaction_header_message(&header));

    Ok(Transaction {
        header,
        header_signature,
        payload,
    })
}

/// Errors building transactions and batches.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Payload encoding failed: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("A batch must contain at least one transaction")]
    EmptyBatch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intkey_address;

    #[test]
    fn test_set_transaction_has_no_dependencies() {
        let signer = KeyPair::from_seed(&[9u8; 32]);
        let txn = create_intkey_transaction(IntKeyVerb::Set, "k", 0, vec![], &signer).unwrap();

        assert!(txn.verify());
        assert!(txn.header.dependencies.is_empty());
        assert_eq!(txn.header.inputs, vec![intkey_address("k")]);
        assert_eq!(
            txn.intkey_payload().unwrap(),
            IntKeyPayload::new(IntKeyVerb::Set, "k", 0)
        );
    }

    #[test]
    fn test_inc_transaction_carries_dependency() {
        let signer = KeyPair::from_seed(&[9u8; 32]);
        let set = create_intkey_transaction(IntKeyVerb::Set, "k", 0, vec![], &signer).unwrap();
        let inc =
            create_intkey_transaction(IntKeyVerb::Inc, "k", 1, vec![set.id()], &signer).unwrap();

        assert!(inc.verify());
        assert_eq!(inc.header.dependencies, vec![set.id()]);
    }

    #[test]
    fn test_identical_payloads_get_distinct_ids() {
        let signer = KeyPair::from_seed(&[9u8; 32]);
        let a = create_intkey_transaction(IntKeyVerb::Inc, "k", 1, vec![], &signer).unwrap();
        let b = create_intkey_transaction(IntKeyVerb::Inc, "k", 1, vec![], &signer).unwrap();

        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let signer = KeyPair::from_seed(&[9u8; 32]);
        let mut txn = create_intkey_transaction(IntKeyVerb::Set, "k", 0, vec![], &signer).unwrap();
        txn.payload = IntKeyPayload::new(IntKeyVerb::Set, "k", 5).encode().unwrap();

        assert!(!txn.verify());
    }
}
