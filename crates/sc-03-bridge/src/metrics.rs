//! Bridge counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe bridge counters.
#[derive(Debug, Default)]
pub struct BridgeMetrics {
    /// Transfers accepted.
    pub initiated: AtomicU64,
    /// Initiations refused.
    pub rejected: AtomicU64,
    /// Transfers completed.
    pub completed: AtomicU64,
    /// Transfers failed.
    pub failed: AtomicU64,
    /// Snapshot writes that failed.
    pub persist_failures: AtomicU64,
}

/// Point-in-time copy of [`BridgeMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BridgeMetricsSnapshot {
    /// Transfers accepted.
    pub initiated: u64,
    /// Initiations refused.
    pub rejected: u64,
    /// Transfers completed.
    pub completed: u64,
    /// Transfers failed.
    pub failed: u64,
    /// Snapshot writes that failed.
    pub persist_failures: u64,
}

impl BridgeMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy current values.
    pub fn snapshot(&self) -> BridgeMetricsSnapshot {
        BridgeMetricsSnapshot {
            initiated: self.initiated.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }
}
