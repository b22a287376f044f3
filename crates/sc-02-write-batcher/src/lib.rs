//! # SC-02 Write Batcher
//!
//! Shipment and event lifecycle with synchronous or deferred ledger writes.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Persist shipments and events to the record store
//! - Route each ledger write: direct, deferred, awaiting bridge, or dropped
//! - Drain the deferred queue on a fixed interval
//!
//! ## Flush Semantics
//!
//! | Property | Behavior |
//! |----------|----------|
//! | Single flight | One cycle at a time; the queue is swapped out atomically |
//! | Ordering | FIFO per shipment, shipments concurrent |
//! | Failure | Logged, left unrecorded, never retried automatically |
//! | Durability | Queue is memory only; lost on crash |
//!
//! ## Module Structure
//!
//! ```text
//! sc-02-write-batcher/
//! ├── domain/          # BatcherConfig, PendingWrite, PendingQueue, errors
//! ├── algorithms/      # write routing
//! ├── ports/           # ShipmentSyncApi, outbound re-exports
//! ├── metrics.rs       # BatcherMetrics
//! └── service.rs       # WriteBatcher, flush task
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use algorithms::route_write;
pub use domain::{
    BatcherConfig, BatcherError, FlushReport, LedgerOutcome, NoOpReason, PendingBatch,
    PendingQueue, PendingWrite, ResubmittedWrite, WriteMode, WriteReceipt, WriteRoute, WriteTag,
};
pub use metrics::{BatcherMetrics, BatcherMetricsSnapshot};
pub use ports::ShipmentSyncApi;
pub use service::{flush_task, WriteBatcher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
