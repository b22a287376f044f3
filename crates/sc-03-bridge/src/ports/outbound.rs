//! # Outbound Ports
//!
//! The coordinator verifies on the source chain and registers on the
//! target through [`LedgerGateway`], keeps its maps in [`RecordStore`] and
//! announces transfer outcomes through [`EventPublisher`].

pub use shared_bus::EventPublisher;
pub use shared_types::{LedgerGateway, RecordStore};
