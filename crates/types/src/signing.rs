//! Domain-separated signing messages for transactions and batches.
//!
//! Each signable header has a unique domain tag prefix so that a transaction
//! header signature can never be replayed as a batch header signature.
//!
//! | Tag | Purpose |
//! |-----|---------|
//! | `intkey_txn:` | Transaction headers |
//! | `intkey_batch:` | Batch headers |
//!
//! Variable-length fields are length-prefixed (u32 little-endian) so that
//! distinct headers never produce the same message.

use crate::{BatchHeader, TransactionHeader};

/// Domain tag for transaction headers.
pub const DOMAIN_TRANSACTION_HEADER: &[u8] = b"intkey_txn:";

/// Domain tag for batch headers.
pub const DOMAIN_BATCH_HEADER: &[u8] = b"intkey_batch:";

fn put_bytes(message: &mut Vec<u8>, bytes: &[u8]) {
    message.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    message.extend_from_slice(bytes);
}

/// Build the signing message for a transaction header.
///
/// Format: `intkey_txn:` || family || version || inputs || outputs ||
/// dependencies || payload_hash || signer || batcher || nonce
pub fn transaction_header_message(header: &TransactionHeader) -> Vec<u8> {
    let mut message = Vec::with_capacity(256);
    message.extend_from_slice(DOMAIN_TRANSACTION_HEADER);
    put_bytes(&mut message, header.family_name.as_bytes());
    put_bytes(&mut message, header.family_version.as_bytes());

    message.extend_from_slice(&(header.inputs.len() as u32).to_le_bytes());
    for input in &header.inputs {
        put_bytes(&mut message, input.as_bytes());
    }
    message.extend_from_slice(&(header.outputs.len() as u32).to_le_bytes());
    for output in &header.outputs {
        put_bytes(&mut message, output.as_bytes());
    }
    message.extend_from_slice(&(header.dependencies.len() as u32).to_le_bytes());
    for dep in &header.dependencies {
        message.extend_from_slice(dep.0.as_bytes());
    }

    message.extend_from_slice(header.payload_hash.as_bytes());
    message.extend_from_slice(header.signer_public_key.as_bytes());
    message.extend_from_slice(header.batcher_public_key.as_bytes());
    put_bytes(&mut message, header.nonce.as_bytes());
    message
}

/// Build the signing message for a batch header.
///
/// Format: `intkey_batch:` || signer || transaction_ids
pub fn batch_header_message(header: &BatchHeader) -> Vec<u8> {
    let mut message = Vec::with_capacity(
        DOMAIN_BATCH_HEADER.len() + 36 + header.transaction_ids.len() * 32,
    );
    message.extend_from_slice(DOMAIN_BATCH_HEADER);
    message.extend_from_slice(header.signer_public_key.as_bytes());
    message.extend_from_slice(&(header.transaction_ids.len() as u32).to_le_bytes());
    for id in &header.transaction_ids {
        message.extend_from_slice(id.0.as_bytes());
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Hash, KeyPair, TransactionId};

    fn header(nonce: &str) -> TransactionHeader {
        let key = KeyPair::from_seed(&[3u8; 32]).public_key();
        TransactionHeader {
            family_name: "intkey".to_string(),
            family_version: "1.0".to_string(),
            inputs: vec!["a".to_string()],
            outputs: vec!["a".to_string()],
            dependencies: vec![TransactionId(Hash::from_bytes(b"dep"))],
            payload_hash: Hash::from_bytes(b"payload"),
            signer_public_key: key.clone(),
            batcher_public_key: key,
            nonce: nonce.to_string(),
        }
    }

    #[test]
    fn test_transaction_header_message_deterministic() {
        let msg1 = transaction_header_message(&header("n1"));
        let msg2 = transaction_header_message(&header("n1"));

        assert_eq!(msg1, msg2);
        assert!(msg1.starts_with(DOMAIN_TRANSACTION_HEADER));
    }

    #[test]
    fn test_nonce_changes_message() {
        assert_ne!(
            transaction_header_message(&header("n1")),
            transaction_header_message(&header("n2"))
        );
    }

    #[test]
    fn test_batch_header_message_uses_batch_domain() {
        let key = KeyPair::from_seed(&[3u8; 32]).public_key();
        let msg = batch_header_message(&BatchHeader {
            signer_public_key: key,
            transaction_ids: vec![TransactionId(Hash::from_bytes(b"t"))],
        });

        assert!(msg.starts_with(DOMAIN_BATCH_HEADER));
        assert!(!msg.starts_with(DOMAIN_TRANSACTION_HEADER));
    }
}
