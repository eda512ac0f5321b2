//! Fixtures for tests in downstream crates.

use crate::{create_batch, create_intkey_transaction, Batch, IntKeyVerb, KeyPair};

/// Deterministic key pair for tests.
pub fn test_keypair() -> KeyPair {
    KeyPair::from_seed(&[42u8; 32])
}

/// A signed single-transaction batch setting `name` to 0.
pub fn test_set_batch(name: &str) -> Batch {
    let signer = test_keypair();
    let txn = create_intkey_transaction(IntKeyVerb::Set, name, 0, vec![], &signer)
        .expect("test transaction should build");
    create_batch(vec![txn], &signer).expect("test batch should build")
}
