//! Continuous IntKey load generator.
//!
//! Keeps batches in flight against a pool of ledger-node connections. Each
//! logical key runs a chain of transactions (one "set", then "inc" per
//! commit) until it reaches a completion threshold and a new key takes over.
//!
//! An external driver owns the network I/O and the submission rate. It
//! reports events to the [`LifecycleController`] and is told about every new
//! batch through [`WorkloadDelegate`]:
//!
//! - `on_queue_drained` → start a new key
//! - `on_batch_committed` → increment the key, or start a new one at the threshold
//! - `on_batch_not_committed` → start a new key, leave the slow batch pending
//! - `on_connection_added` / `on_connection_removed` → maintain the pool

pub mod cli;
pub mod config;
mod connection;
mod controller;
mod error;
mod ledger;
mod pending;
mod registry;
mod stats;
mod submitter;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{ConfigError, WorkloadConfig};
pub use connection::{Connection, ConnectionRef, WorkloadDelegate};
pub use controller::LifecycleController;
pub use error::{ConnectionError, WorkloadError};
pub use ledger::{KeyLedger, KeyNameGenerator};
pub use pending::{PendingBatchTable, PendingEntry};
pub use registry::ConnectionRegistry;
pub use stats::{StatsSnapshot, WorkloadStats};
pub use submitter::{BatchSubmitter, KeyAction, Submission};
