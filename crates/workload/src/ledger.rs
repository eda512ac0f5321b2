//! Per-key dependency tracking and key name generation.

use crate::WorkloadError;
use intkey_types::TransactionId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Last transaction written for every key the workload has started.
///
/// Each new transaction on a key depends on the previous one, so the chain
/// is applied in order. Records are kept for the life of the process.
#[derive(Debug, Default)]
pub struct KeyLedger {
    dependencies: HashMap<String, TransactionId>,
}

impl KeyLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `dependency` as the latest transaction for `key_name`.
    ///
    /// Used both for a brand-new key and to advance an existing one.
    pub fn register(&mut self, key_name: impl Into<String>, dependency: TransactionId) {
        self.dependencies.insert(key_name.into(), dependency);
    }

    /// Latest transaction recorded for `key_name`.
    pub fn dependency_of(&self, key_name: &str) -> Result<TransactionId, WorkloadError> {
        self.dependencies
            .get(key_name)
            .copied()
            .ok_or_else(|| WorkloadError::UnknownKey(key_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// Generates key names from the wall clock.
///
/// Names are `<secs>.<nanos>-<seq>`. The per-generator sequence number keeps
/// names distinct even when the clock does not advance between calls.
#[derive(Debug, Default)]
pub struct KeyNameGenerator {
    sequence: AtomicU64,
}

impl KeyNameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next key name.
    pub fn next_name(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        format!("{}.{:09}-{}", now.as_secs(), now.subsec_nanos(), seq)
    }
}
