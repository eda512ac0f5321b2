//! Outstanding batches and the key state they carry.
//!
//! The table is the single source of truth for what is in flight. It keeps a
//! reverse index from connection URL to batch ids so that dropping a
//! connection can evict its entries without scanning the whole table, and a
//! bounded history of resolved ids so that a repeated outcome for the same
//! batch can be told apart from a batch that was never tracked.

use crate::{ConnectionRef, WorkloadError};
use intkey_types::BatchId;
use std::collections::{HashMap, HashSet, VecDeque};

/// State carried by an in-flight batch.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    /// Key the batch's transaction writes.
    pub key_name: String,
    /// Connection the batch was submitted on.
    pub connection: ConnectionRef,
    /// Value the key will hold once this batch commits.
    pub counter_value: u64,
}

/// In-flight batches keyed by batch id.
#[derive(Debug)]
pub struct PendingBatchTable {
    entries: HashMap<BatchId, PendingEntry>,
    /// Reverse index: connection URL -> batch ids pending on it.
    by_connection: HashMap<String, HashSet<BatchId>>,
    /// Recently resolved ids, oldest first.
    resolved: VecDeque<BatchId>,
    resolved_set: HashSet<BatchId>,
    resolved_capacity: usize,
}

impl PendingBatchTable {
    /// Create an empty table remembering up to `resolved_capacity` resolved ids.
    pub fn new(resolved_capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            by_connection: HashMap::new(),
            resolved: VecDeque::with_capacity(resolved_capacity),
            resolved_set: HashSet::with_capacity(resolved_capacity),
            resolved_capacity,
        }
    }

    /// Track a newly submitted batch.
    pub fn insert(&mut self, batch_id: BatchId, entry: PendingEntry) -> Result<(), WorkloadError> {
        if self.entries.contains_key(&batch_id) {
            return Err(WorkloadError::DuplicateBatch(batch_id));
        }

        self.by_connection
            .entry(entry.connection.url().to_string())
            .or_default()
            .insert(batch_id);
        self.entries.insert(batch_id, entry);
        Ok(())
    }

    /// Remove and return the entry for `batch_id`, marking it resolved.
    ///
    /// Returns `None` if the batch is not pending, which is how a second
    /// delivery of the same outcome is detected.
    pub fn take(&mut self, batch_id: &BatchId) -> Option<PendingEntry> {
        let entry = self.entries.remove(batch_id)?;
        self.unindex(batch_id, entry.connection.url());
        self.remember_resolved(*batch_id);
        Some(entry)
    }

    /// Drop every entry submitted on the connection with `url`.
    ///
    /// Returns the number of entries removed. Purged batches are abandoned,
    /// not resolved.
    pub fn purge_by_connection(&mut self, url: &str) -> usize {
        let Some(batch_ids) = self.by_connection.remove(url) else {
            return 0;
        };
        for batch_id in &batch_ids {
            self.entries.remove(batch_id);
        }
        batch_ids.len()
    }

    /// Whether `batch_id` was resolved recently via [`take`](Self::take).
    pub fn was_resolved(&self, batch_id: &BatchId) -> bool {
        self.resolved_set.contains(batch_id)
    }

    pub fn get(&self, batch_id: &BatchId) -> Option<&PendingEntry> {
        self.entries.get(batch_id)
    }

    pub fn contains(&self, batch_id: &BatchId) -> bool {
        self.entries.contains_key(batch_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BatchId, &PendingEntry)> {
        self.entries.iter()
    }

    /// Number of batches pending on the connection with `url`.
    pub fn count_for_connection(&self, url: &str) -> usize {
        self.by_connection.get(url).map_or(0, HashSet::len)
    }

    /// Drop every entry. Resolved history is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.by_connection.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn unindex(&mut self, batch_id: &BatchId, url: &str) {
        if let Some(ids) = self.by_connection.get_mut(url) {
            ids.remove(batch_id);
            if ids.is_empty() {
                self.by_connection.remove(url);
            }
        }
    }

    fn remember_resolved(&mut self, batch_id: BatchId) {
        if self.resolved_capacity == 0 {
            return;
        }
        if self.resolved.len() == self.resolved_capacity {
            if let Some(oldest) = self.resolved.pop_front() {
                self.resolved_set.remove(&oldest);
            }
        }
        self.resolved.push_back(batch_id);
        self.resolved_set.insert(batch_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingConnection;
    use intkey_types::Hash;

    fn batch(label: &[u8]) -> BatchId {
        BatchId(Hash::from_bytes(label))
    }

    fn entry(connection: &ConnectionRef, counter_value: u64) -> PendingEntry {
        PendingEntry {
            key_name: "k".to_string(),
            connection: connection.clone(),
            counter_value,
        }
    }

    #[test]
    fn test_insert_and_take() {
        let conn = RecordingConnection::shared("tcp://a");
        let mut table = PendingBatchTable::new(16);

        table.insert(batch(b"b1"), entry(&conn, 3)).unwrap();
        assert!(table.contains(&batch(b"b1")));
        assert_eq!(table.count_for_connection("tcp://a"), 1);

        let taken = table.take(&batch(b"b1")).unwrap();
        assert_eq!(taken.counter_value, 3);
        assert!(table.is_empty());
        assert_eq!(table.count_for_connection("tcp://a"), 0);

        // Second take is a miss, but the id is remembered as resolved
        assert!(table.take(&batch(b"b1")).is_none());
        assert!(table.was_resolved(&batch(b"b1")));
        assert!(!table.was_resolved(&batch(b"never")));
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let conn = RecordingConnection::shared("tcp://a");
        let mut table = PendingBatchTable::new(16);

        table.insert(batch(b"b1"), entry(&conn, 0)).unwrap();
        let err = table.insert(batch(b"b1"), entry(&conn, 5)).unwrap_err();

        assert!(matches!(err, WorkloadError::DuplicateBatch(id) if id == batch(b"b1")));
        // Original entry untouched
        assert_eq!(table.get(&batch(b"b1")).unwrap().counter_value, 0);
    }

    #[test]
    fn test_purge_by_connection() {
        let a = RecordingConnection::shared("tcp://a");
        let b = RecordingConnection::shared("tcp://b");
        let mut table = PendingBatchTable::new(16);

        table.insert(batch(b"a1"), entry(&a, 0)).unwrap();
        table.insert(batch(b"a2"), entry(&a, 1)).unwrap();
        table.insert(batch(b"b1"), entry(&b, 0)).unwrap();

        assert_eq!(table.purge_by_connection("tcp://a"), 2);
        assert_eq!(table.purge_by_connection("tcp://a"), 0);

        assert_eq!(table.len(), 1);
        assert!(table.iter().all(|(_, e)| e.connection.url() != "tcp://a"));
        assert!(table.contains(&batch(b"b1")));
        // Purged ids are abandoned, not resolved
        assert!(!table.was_resolved(&batch(b"a1")));
    }

    #[test]
    fn test_resolved_history_is_bounded() {
        let conn = RecordingConnection::shared("tcp://a");
        let mut table = PendingBatchTable::new(2);

        for label in [b"x1", b"x2", b"x3"] {
            table.insert(batch(label), entry(&conn, 0)).unwrap();
            table.take(&batch(label));
        }

        assert!(!table.was_resolved(&batch(b"x1")));
        assert!(table.was_resolved(&batch(b"x2")));
        assert!(table.was_resolved(&batch(b"x3")));
    }
}
