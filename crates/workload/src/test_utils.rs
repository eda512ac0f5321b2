//! In-memory connection and driver doubles for tests.

use crate::{Connection, ConnectionError, ConnectionRef, WorkloadDelegate};
use intkey_types::{BatchId, BatchList};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Connection that records every batch list it is asked to send.
#[derive(Debug)]
pub struct RecordingConnection {
    url: String,
    sent: Mutex<Vec<BatchList>>,
    failing: AtomicBool,
    closed: AtomicBool,
}

impl RecordingConnection {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            sent: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// A new connection behind a shared handle.
    pub fn shared(url: &str) -> ConnectionRef {
        Arc::new(Self::new(url))
    }

    /// Make subsequent sends fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<BatchList> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Connection for RecordingConnection {
    fn url(&self) -> &str {
        &self.url
    }

    fn send(&self, batches: &BatchList) -> Result<(), ConnectionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ConnectionError::Closed);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ConnectionError::Transport("injected failure".to_string()));
        }
        self.sent.lock().push(batches.clone());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Driver double that records every new-batch notification.
#[derive(Debug, Default)]
pub struct RecordingDelegate {
    batches: Mutex<Vec<(BatchId, String)>>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications so far, as (batch id, connection URL).
    pub fn batches(&self) -> Vec<(BatchId, String)> {
        self.batches.lock().clone()
    }

    pub fn last(&self) -> Option<(BatchId, String)> {
        self.batches.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.lock().is_empty()
    }
}

impl WorkloadDelegate for RecordingDelegate {
    fn on_new_batch(&self, batch_id: BatchId, connection: ConnectionRef) {
        self.batches
            .lock()
            .push((batch_id, connection.url().to_string()));
    }
}
