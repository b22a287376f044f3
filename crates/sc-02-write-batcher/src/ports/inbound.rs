//! # Inbound Ports
//!
//! API trait defining what the write batcher can do.

use async_trait::async_trait;
use shared_types::{EventRecord, NewEvent, NewShipment, ShipmentRecord};

use crate::domain::{BatcherError, FlushReport, WriteReceipt};

/// Shipment synchronization API - inbound port.
#[async_trait]
pub trait ShipmentSyncApi: Send + Sync {
    /// Create and persist a shipment, then route its ledger registration.
    ///
    /// Succeeds whenever persistence succeeds, whatever the ledger says.
    async fn create_shipment(
        &self,
        input: NewShipment,
        record_on_chain: bool,
    ) -> Result<WriteReceipt<ShipmentRecord>, BatcherError>;

    /// Append an event to a shipment, then route its ledger write.
    async fn record_event(
        &self,
        shipment_id: &str,
        input: NewEvent,
        record_on_chain: bool,
    ) -> Result<WriteReceipt<EventRecord>, BatcherError>;

    /// Drain the deferred queue once.
    async fn flush(&self) -> FlushReport;

    /// Load a shipment.
    fn get_shipment(&self, shipment_id: &str) -> Result<Option<ShipmentRecord>, BatcherError>;

    /// Load an event.
    fn get_event(&self, event_id: &str) -> Result<Option<EventRecord>, BatcherError>;

    /// Events of a shipment in append order.
    fn shipment_events(&self, shipment_id: &str) -> Result<Vec<EventRecord>, BatcherError>;
}
