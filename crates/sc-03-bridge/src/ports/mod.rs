//! # Ports Module
//!
//! Inbound API and the outbound dependencies of the bridge coordinator.

pub mod inbound;
pub mod outbound;

pub use inbound::BridgeApi;
pub use outbound::{EventPublisher, LedgerGateway, RecordStore};
