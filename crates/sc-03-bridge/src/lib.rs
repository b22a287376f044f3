//! # SC-03 Bridge Coordinator
//!
//! Relocates a shipment's canonical ledger record from one chain to another.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Verify the shipment on the source chain before accepting a transfer
//! - Register it on the target chain from a snapshot taken at acceptance
//! - Keep every transfer durable across restarts
//!
//! ## Transfer Lifecycle
//!
//! | Status | Map | Next |
//! |--------|-----|------|
//! | pending | pending | processing |
//! | processing | pending | completed, failed |
//! | completed | confirmed | terminal |
//! | failed | pending | terminal, never retried |
//!
//! Processing runs as a background task per transfer. The coordinator keeps
//! the task handles so callers can await or abort them.
//!
//! ## Module Structure
//!
//! ```text
//! sc-03-bridge/
//! ├── domain/          # TransferRecord, TransferStatus, TransferBook, BridgeConfig, errors
//! ├── algorithms/      # transfer id derivation
//! ├── ports/           # BridgeApi, outbound re-exports
//! ├── metrics.rs       # BridgeMetrics
//! └── service.rs       # BridgeCoordinator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use algorithms::{derive_transfer_id, TRANSFER_ID_LEN};
pub use domain::{
    invariant_book_partition, invariant_terminal_outcome, BridgeConfig, BridgeError,
    RecoveredTransfers, TransferBook, TransferId, TransferInitiation, TransferMap, TransferRecord,
    TransferStatus,
};
pub use metrics::{BridgeMetrics, BridgeMetricsSnapshot};
pub use ports::BridgeApi;
pub use service::{BridgeCoordinator, TRANSFER_MAP_KEY};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
