//! # SC-01 Shard Assignment
//!
//! Deterministic partitioning of shipment identifiers.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - `Keccak256(id) mod N` assignment, stable across restarts and machines
//! - Local-responsibility check against a static shard → node table
//!
//! Stateless, no I/O, no mutation. The write batcher consults it once per
//! write to pick between a direct ledger write and the bridge.
//!
//! ## Module Structure
//!
//! ```text
//! sc-01-shard-assignment/
//! ├── domain/          # ShardConfig, OwnershipTable, ShardError
//! ├── algorithms/      # keccak-mod assignment
//! ├── ports/           # ShardingApi
//! └── service.rs       # ShardAssigner
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use algorithms::assign_shard;
pub use domain::{
    invariant_deterministic_assignment, invariant_shard_in_range, NodeId, OwnershipTable,
    ShardConfig, ShardError, ShardId, MAX_SHARD_COUNT, MIN_SHARD_COUNT,
};
pub use ports::ShardingApi;
pub use service::ShardAssigner;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
