//! Write batcher counters.
//!
//! Failed and dropped writes are never retried, so these counters are the
//! operator's view of what is stuck unrecorded.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe write batcher counters.
#[derive(Debug, Default)]
pub struct BatcherMetrics {
    /// Ledger calls issued on the request path.
    pub sync_writes: AtomicU64,
    /// Request-path ledger calls that failed.
    pub sync_failures: AtomicU64,
    /// Writes placed in the deferred queue.
    pub enqueued_writes: AtomicU64,
    /// Flush cycles run.
    pub flush_cycles: AtomicU64,
    /// Deferred writes that landed.
    pub flush_successes: AtomicU64,
    /// Deferred writes that failed.
    pub flush_failures: AtomicU64,
    /// Writes dropped (not responsible, bridging disabled).
    pub dropped_writes: AtomicU64,
    /// Writes parked until a bridge relocation.
    pub awaiting_bridge: AtomicU64,
}

/// Point-in-time copy of [`BatcherMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatcherMetricsSnapshot {
    /// Ledger calls issued on the request path.
    pub sync_writes: u64,
    /// Request-path ledger calls that failed.
    pub sync_failures: u64,
    /// Writes placed in the deferred queue.
    pub enqueued_writes: u64,
    /// Flush cycles run.
    pub flush_cycles: u64,
    /// Deferred writes that landed.
    pub flush_successes: u64,
    /// Deferred writes that failed.
    pub flush_failures: u64,
    /// Writes dropped.
    pub dropped_writes: u64,
    /// Writes parked until a bridge relocation.
    pub awaiting_bridge: u64,
}

impl BatcherMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: usize) {
        counter.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Copy current values.
    pub fn snapshot(&self) -> BatcherMetricsSnapshot {
        BatcherMetricsSnapshot {
            sync_writes: self.sync_writes.load(Ordering::Relaxed),
            sync_failures: self.sync_failures.load(Ordering::Relaxed),
            enqueued_writes: self.enqueued_writes.load(Ordering::Relaxed),
            flush_cycles: self.flush_cycles.load(Ordering::Relaxed),
            flush_successes: self.flush_successes.load(Ordering::Relaxed),
            flush_failures: self.flush_failures.load(Ordering::Relaxed),
            dropped_writes: self.dropped_writes.load(Ordering::Relaxed),
            awaiting_bridge: self.awaiting_bridge.load(Ordering::Relaxed),
        }
    }
}
