//! # Shipment-Chain Test Suite
//!
//! Unified test crate for behavior that spans subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks (routing, digest, flush)
//! └── src/integration/
//!     ├── sync_flows.rs     # shard assigner + write batcher
//!     ├── bridge_flows.rs   # bridge coordinator, restart recovery
//!     └── runtime_flows.rs  # full node: relocation choreography, config
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sc-tests
//!
//! # By area
//! cargo test -p sc-tests integration::bridge_flows
//!
//! # Benchmarks
//! cargo bench -p sc-tests
//! ```

#![allow(dead_code)]

pub mod integration;
