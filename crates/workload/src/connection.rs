//! Node connections and the driver callback.

use crate::ConnectionError;
use intkey_types::{BatchId, BatchList};
use std::fmt;
use std::sync::Arc;

/// A logical channel to one ledger node.
///
/// Connections are identified by their URL. The transport behind `send`
/// belongs to the embedding driver; from the workload's point of view a send
/// is fire-and-forget and no reply is consumed.
pub trait Connection: Send + Sync + fmt::Debug {
    /// Stable address identifying the node.
    fn url(&self) -> &str;

    /// Transmit a batch-submission request.
    fn send(&self, batches: &BatchList) -> Result<(), ConnectionError>;

    /// Release the underlying transport. Called once at shutdown.
    fn close(&self) {}
}

/// Shared handle to a connection.
pub type ConnectionRef = Arc<dyn Connection>;

/// Callback into the external driver.
///
/// The driver uses it to track the new batch and later report whether it
/// committed.
pub trait WorkloadDelegate: Send + Sync {
    /// A new batch is outstanding on `connection`.
    fn on_new_batch(&self, batch_id: BatchId, connection: ConnectionRef);
}
