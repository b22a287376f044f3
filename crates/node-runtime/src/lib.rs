//! # Shipment-Chain Node Runtime
//!
//! Assembles the shard assigner, the write batcher and the bridge
//! coordinator behind concrete adapters, and runs their background tasks.
//! The main entry point is the `main.rs` binary.
//!
//! ## Architectural Patterns
//!
//! - **EDA**: the bridge never calls the batcher; relocation flows through
//!   the event bus
//! - **Hexagonal Architecture**: subsystems declare ports, this crate
//!   provides the adapters
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the subsystem container
//! - `adapters/` - file-backed record store, simulated ledger
//! - `wiring/` - event-driven relocation
//! - `runtime.rs` - startup and graceful shutdown

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod container;
pub mod runtime;
pub mod wiring;

pub use adapters::{DataDirLock, FileBackedRecordStore, LockError, SimulatedLedger};
pub use container::{
    ChainEndpoint, ConfigError, ContainerError, NodeConfig, StorageConfig, SubsystemContainer,
};
pub use runtime::{NodeRuntime, SHUTDOWN_GRACE};
pub use wiring::{relocate, Relocation, RelocationHandler};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
