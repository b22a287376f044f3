//! # Ports Module
//!
//! Inbound API and the outbound dependencies of the write batcher.

pub mod inbound;
pub mod outbound;

pub use inbound::ShipmentSyncApi;
pub use outbound::{EventPublisher, LedgerGateway, RecordStore, ShardingApi};
