//! Error types for the workload.

use intkey_types::{BatchId, TransactionError};

/// Errors raised while driving key chains.
///
/// None of these escape the lifecycle controller: each is logged and turned
/// into "start a new key" or a no-op.
#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    /// A key was referenced that the ledger never recorded.
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// A batch id was already pending.
    #[error("Duplicate batch: {0}")]
    DuplicateBatch(BatchId),

    /// No connection is registered to submit against.
    #[error("No connections available")]
    NoConnectionsAvailable,

    /// Transaction or batch construction failed.
    #[error("Transaction build failed: {0}")]
    Transaction(#[from] TransactionError),

    /// The connection refused or failed to transmit a batch.
    #[error("Send to {url} failed: {source}")]
    Send {
        url: String,
        #[source]
        source: ConnectionError,
    },
}

/// Errors reported by a [`Connection`](crate::Connection) transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("connection closed")]
    Closed,

    #[error("transport error: {0}")]
    Transport(String),
}
