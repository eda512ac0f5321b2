//! Batch lifecycle state machine.
//!
//! Each key runs a chain: a "set 0" batch, then one "inc 1" batch per commit
//! until the key's counter reaches the completion threshold, at which point
//! the key is abandoned and a fresh key starts. The driver reports outcomes;
//! the controller decides what to submit next.
//!
//! # Locking
//!
//! Connections, key dependencies and pending batches sit behind one mutex.
//! Handlers read what they need under the lock, build and send the next
//! batch with the lock released, then take the lock again to record it.
//! Recording is skipped if the connection was removed in between, so a
//! removed connection never has entries pointing at it.

use crate::{
    BatchSubmitter, ConnectionRef, ConnectionRegistry, KeyAction, KeyLedger, KeyNameGenerator,
    PendingBatchTable, PendingEntry, Submission, WorkloadConfig, WorkloadDelegate, WorkloadError,
    WorkloadStats,
};
use intkey_types::{BatchId, KeyPair, TransactionId};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared mutable state, guarded by the controller's lock.
struct WorkloadState {
    connections: ConnectionRegistry,
    keys: KeyLedger,
    pending: PendingBatchTable,
    rng: ChaCha8Rng,
}

/// What a committed batch leads to, decided under the lock.
enum CommitOutcome {
    /// Batch was resolved before; nothing to do.
    Duplicate,
    /// Batch was never tracked (or was purged); start a fresh key.
    Untracked,
    /// Key reached the completion threshold.
    Completed(PendingEntry),
    /// Key continues with an increment after `dependency`.
    Continue {
        entry: PendingEntry,
        dependency: TransactionId,
    },
    /// Pending entry references a key with no ledger record.
    Broken(PendingEntry, WorkloadError),
}

/// Drives IntKey key chains against a pool of connections.
pub struct LifecycleController<D: WorkloadDelegate> {
    state: Mutex<WorkloadState>,
    submitter: BatchSubmitter,
    key_names: KeyNameGenerator,
    completion_threshold: u64,
    delegate: D,
    stats: Arc<WorkloadStats>,
}

impl<D: WorkloadDelegate> LifecycleController<D> {
    /// Create a controller with no connections.
    ///
    /// `signer` signs every transaction and batch; `delegate` is told about
    /// every new batch.
    pub fn new(config: &WorkloadConfig, signer: KeyPair, delegate: D) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            state: Mutex::new(WorkloadState {
                connections: ConnectionRegistry::new(),
                keys: KeyLedger::new(),
                pending: PendingBatchTable::new(config.resolved_history),
                rng,
            }),
            submitter: BatchSubmitter::new(signer),
            key_names: KeyNameGenerator::new(),
            completion_threshold: config.completion_threshold,
            delegate,
            stats: Arc::new(WorkloadStats::new()),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Driver events
    // ═══════════════════════════════════════════════════════════════════════

    /// Called before the driver starts issuing events.
    pub fn on_will_start(&self) {
        let connections = self.state.lock().connections.len();
        info!(
            completion_threshold = self.completion_threshold,
            connections, "IntKey workload starting"
        );
    }

    /// Called when the driver stops. Closes and forgets every connection.
    pub fn on_will_stop(&self) {
        let (connections, abandoned) = {
            let mut state = self.state.lock();
            let abandoned = state.pending.len();
            state.pending.clear();
            (state.connections.drain(), abandoned)
        };

        for connection in &connections {
            connection.close();
        }

        info!(
            connections = connections.len(),
            abandoned,
            stats = %self.stats.snapshot(),
            "IntKey workload stopped"
        );
    }

    /// No batches are outstanding anywhere: start a new key.
    pub fn on_queue_drained(&self) {
        self.start_new_key();
    }

    /// A batch was committed.
    ///
    /// The batch's entry is taken out of the pending table exactly once; a
    /// repeated report for the same batch is logged and ignored.
    pub fn on_batch_committed(&self, batch_id: &BatchId) {
        match self.resolve_commit(batch_id) {
            CommitOutcome::Duplicate => {
                self.stats.record_duplicate_commit();
                debug!(%batch_id, "Batch already resolved; ignoring repeated commit");
            }
            CommitOutcome::Untracked => {
                self.stats.record_untracked_commit();
                debug!(%batch_id, "Committed batch is not tracked; starting a new key");
                self.start_new_key();
            }
            CommitOutcome::Completed(entry) => {
                self.stats.record_commit();
                self.stats.record_key_completed();
                debug!(key = %entry.key_name, value = entry.counter_value, "Key completed");
                self.start_new_key();
            }
            CommitOutcome::Continue { entry, dependency } => {
                self.stats.record_commit();
                self.increment_key(entry, dependency);
            }
            CommitOutcome::Broken(entry, error) => {
                self.stats.record_commit();
                warn!(key = %entry.key_name, error = %error, "Abandoning key");
                debug_assert!(false, "pending key {} has no ledger record", entry.key_name);
                self.start_new_key();
            }
        }
    }

    /// A batch has been checked and is not committed yet.
    ///
    /// The batch stays pending so the driver can check it again; a new key
    /// is started so the pipeline does not stall behind it.
    pub fn on_batch_not_committed(&self, batch_id: &BatchId) {
        self.stats.record_not_committed();
        if !self.state.lock().pending.contains(batch_id) {
            debug!(%batch_id, "Not-committed report for a batch that is not pending");
        }
        self.start_new_key();
    }

    /// A node connection became available.
    pub fn on_connection_added(&self, connection: ConnectionRef) {
        info!(url = connection.url(), "Connection added");
        self.state.lock().connections.add(connection);
    }

    /// A node connection went away. Batches pending on it are abandoned.
    pub fn on_connection_removed(&self, url: &str) {
        let (removed, purged) = {
            let mut state = self.state.lock();
            let removed = state.connections.remove(url);
            let purged = state.pending.purge_by_connection(url);
            (removed, purged)
        };

        self.stats.record_purged(purged);
        info!(url, removed, purged, "Connection removed");
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Key chains
    // ═══════════════════════════════════════════════════════════════════════

    /// Start a new key chain on a random connection.
    ///
    /// A no-op when no connection is registered.
    pub fn start_new_key(&self) {
        let connection = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            state.connections.pick_random(&mut state.rng)
        };

        let Some(connection) = connection else {
            debug!(error = %WorkloadError::NoConnectionsAvailable, "Not starting a new key");
            return;
        };

        let name = self.key_names.next_name();
        let submission = match self
            .submitter
            .submit(&KeyAction::Start { name: &name }, connection.as_ref())
        {
            Ok(submission) => submission,
            Err(error) => {
                self.stats.record_send_failure();
                warn!(key = %name, error = %error, "Failed to submit new key");
                return;
            }
        };

        if self.record_submission(&name, &connection, submission, 0) {
            self.stats.record_key_started();
            debug!(
                key = %name,
                batch_id = %submission.batch_id,
                url = connection.url(),
                "Started key"
            );
            self.delegate.on_new_batch(submission.batch_id, connection);
        }
    }

    /// Take the committed batch's entry and decide what follows.
    fn resolve_commit(&self, batch_id: &BatchId) -> CommitOutcome {
        let mut state = self.state.lock();

        let Some(entry) = state.pending.take(batch_id) else {
            return if state.pending.was_resolved(batch_id) {
                CommitOutcome::Duplicate
            } else {
                CommitOutcome::Untracked
            };
        };

        if entry.counter_value >= self.completion_threshold {
            return CommitOutcome::Completed(entry);
        }

        match state.keys.dependency_of(&entry.key_name) {
            Ok(dependency) => CommitOutcome::Continue { entry, dependency },
            Err(error) => CommitOutcome::Broken(entry, error),
        }
    }

    /// Submit the next increment for a key on the connection it was using.
    fn increment_key(&self, entry: PendingEntry, dependency: TransactionId) {
        let action = KeyAction::Increment {
            name: &entry.key_name,
            dependency,
        };

        let submission = match self.submitter.submit(&action, entry.connection.as_ref()) {
            Ok(submission) => submission,
            Err(error) => {
                self.stats.record_send_failure();
                warn!(
                    key = %entry.key_name,
                    error = %error,
                    "Failed to submit increment; starting a new key"
                );
                self.start_new_key();
                return;
            }
        };

        let next_value = entry.counter_value + 1;
        if self.record_submission(&entry.key_name, &entry.connection, submission, next_value) {
            self.stats.record_increment();
            self.delegate.on_new_batch(submission.batch_id, entry.connection);
        }
    }

    /// Record a sent batch: advance the key's dependency and track the batch.
    ///
    /// Returns false if nothing was recorded, either because the connection
    /// was removed while the batch was being sent or because the batch id
    /// is already pending.
    fn record_submission(
        &self,
        key_name: &str,
        connection: &ConnectionRef,
        submission: Submission,
        counter_value: u64,
    ) -> bool {
        let mut state = self.state.lock();

        if !state.connections.is_registered(connection) {
            debug!(
                key = %key_name,
                url = connection.url(),
                batch_id = %submission.batch_id,
                "Connection removed during submission; dropping batch"
            );
            return false;
        }

        let entry = PendingEntry {
            key_name: key_name.to_string(),
            connection: connection.clone(),
            counter_value,
        };
        if let Err(error) = state.pending.insert(submission.batch_id, entry) {
            warn!(key = %key_name, error = %error, "Batch not tracked");
            return false;
        }
        state.keys.register(key_name, submission.transaction_id);
        true
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════════

    /// Shared handle to the progress counters.
    pub fn stats(&self) -> Arc<WorkloadStats> {
        self.stats.clone()
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Copy of the pending entry for `batch_id`, if any.
    pub fn pending_entry(&self, batch_id: &BatchId) -> Option<PendingEntry> {
        self.state.lock().pending.get(batch_id).cloned()
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Number of batches pending on connections with `url`.
    pub fn pending_count_for(&self, url: &str) -> usize {
        self.state.lock().pending.count_for_connection(url)
    }

    pub fn connection_count(&self) -> usize {
        self.state.lock().connections.len()
    }

    /// Number of keys started over the controller's lifetime.
    pub fn key_count(&self) -> usize {
        self.state.lock().keys.len()
    }

    /// Latest transaction recorded for a key.
    pub fn dependency_of(&self, key_name: &str) -> Result<TransactionId, WorkloadError> {
        self.state.lock().keys.dependency_of(key_name)
    }
}
