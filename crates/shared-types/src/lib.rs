//! # Shared Types Crate
//!
//! Records and outbound ports shared by the shard assigner, the write
//! batcher and the bridge coordinator.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: shipment and event records are defined here
//!   and nowhere else.
//! - **Ports, not adapters**: the ledger gateway and the record store are
//!   traits; concrete adapters live in `node-runtime`.
//! - **Digests on chain**: ledgers only ever receive the SHA-256 digest of a
//!   record's canonical metadata.

pub mod digest;
pub mod entities;
pub mod errors;
pub mod identifiers;
pub mod ledger;
pub mod store;

pub use digest::metadata_digest;
pub use entities::*;
pub use errors::*;
pub use identifiers::{
    generate_tracking_number, is_tracking_number, validate_identifier, IdentifierIssue,
    DEFAULT_TRACKING_PREFIX, MAX_IDENTIFIER_LEN,
};
pub use ledger::{
    GatewayCall, LedgerGateway, LedgerReceipt, MockLedgerGateway, ShipmentVerification,
};
pub use store::{InMemoryRecordStore, Namespace, RecordStore, RecordStoreExt};
