//! Atomic counters describing workload progress.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters updated by the lifecycle controller.
///
/// Reading them never takes the controller lock, so a driver can display
/// progress at its own frequency.
#[derive(Debug, Default)]
pub struct WorkloadStats {
    keys_started: AtomicU64,
    keys_completed: AtomicU64,
    batches_submitted: AtomicU64,
    increments_submitted: AtomicU64,
    commits_observed: AtomicU64,
    untracked_commits: AtomicU64,
    duplicate_commits: AtomicU64,
    not_committed: AtomicU64,
    batches_purged: AtomicU64,
    send_failures: AtomicU64,
}

impl WorkloadStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_key_started(&self) {
        self.keys_started.fetch_add(1, Ordering::Relaxed);
        self.batches_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_increment(&self) {
        self.increments_submitted.fetch_add(1, Ordering::Relaxed);
        self.batches_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_key_completed(&self) {
        self.keys_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self) {
        self.commits_observed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_untracked_commit(&self) {
        self.untracked_commits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate_commit(&self) {
        self.duplicate_commits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_not_committed(&self) {
        self.not_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_purged(&self, count: usize) {
        self.batches_purged.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            keys_started: self.keys_started.load(Ordering::Relaxed),
            keys_completed: self.keys_completed.load(Ordering::Relaxed),
            batches_submitted: self.batches_submitted.load(Ordering::Relaxed),
            increments_submitted: self.increments_submitted.load(Ordering::Relaxed),
            commits_observed: self.commits_observed.load(Ordering::Relaxed),
            untracked_commits: self.untracked_commits.load(Ordering::Relaxed),
            duplicate_commits: self.duplicate_commits.load(Ordering::Relaxed),
            not_committed: self.not_committed.load(Ordering::Relaxed),
            batches_purged: self.batches_purged.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`WorkloadStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub keys_started: u64,
    pub keys_completed: u64,
    pub batches_submitted: u64,
    pub increments_submitted: u64,
    /// Commits of batches that were pending.
    pub commits_observed: u64,
    /// Commits for batches that were never tracked.
    pub untracked_commits: u64,
    /// Repeated commits for batches already resolved.
    pub duplicate_commits: u64,
    pub not_committed: u64,
    pub batches_purged: u64,
    pub send_failures: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batches submitted: {} (keys started: {}, increments: {}), commits: {}, \
             keys completed: {}, not committed: {}, purged: {}, send failures: {}",
            self.batches_submitted,
            self.keys_started,
            self.increments_submitted,
            self.commits_observed,
            self.keys_completed,
            self.not_committed,
            self.batches_purged,
            self.send_failures,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submissions_roll_up() {
        let stats = WorkloadStats::new();
        stats.record_key_started();
        stats.record_increment();
        stats.record_increment();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.keys_started, 1);
        assert_eq!(snapshot.increments_submitted, 2);
        assert_eq!(snapshot.batches_submitted, 3);
    }

    #[test]
    fn test_display() {
        let stats = WorkloadStats::new();
        stats.record_purged(4);

        let line = stats.snapshot().to_string();
        assert!(line.contains("purged: 4"));
        assert!(line.starts_with("batches submitted: 0"));
    }
}
