//! Domain-specific identifier types.

use crate::{Hash, Signature};
use std::fmt;

/// Identifier of a signed transaction.
///
/// Derived from the transaction's header signature, so two transactions
/// only share an id if they share a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub Hash);

impl TransactionId {
    /// Derive the id from a header signature.
    pub fn from_signature(signature: &Signature) -> Self {
        TransactionId(Hash::from_parts(&[b"txn", signature.as_bytes()]))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a signed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(pub Hash);

impl BatchId {
    /// Derive the id from a header signature.
    pub fn from_signature(signature: &Signature) -> Self {
        BatchId(Hash::from_parts(&[b"batch", signature.as_bytes()]))
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
