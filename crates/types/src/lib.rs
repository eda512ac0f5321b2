//! Core types for the IntKey workload.
//!
//! Transactions, batches, identifiers and the signing primitives used to
//! build them. Nothing here performs I/O.

mod batch;
mod crypto;
mod hash;
mod identifiers;
mod payload;
mod signing;
mod transaction;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use batch::{create_batch, Batch, BatchHeader, BatchList};
pub use crypto::{KeyPair, PublicKey, Signature};
pub use hash::{Hash, HexError};
pub use identifiers::{BatchId, TransactionId};
pub use payload::{
    intkey_address, namespace_prefix, IntKeyPayload, IntKeyVerb, FAMILY_NAME, FAMILY_VERSION,
};
pub use signing::{
    batch_header_message, transaction_header_message, DOMAIN_BATCH_HEADER,
    DOMAIN_TRANSACTION_HEADER,
};
pub use transaction::{create_intkey_transaction, Transaction, TransactionError, TransactionHeader};
