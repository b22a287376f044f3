//! # Inbound Ports
//!
//! API trait defining what the bridge coordinator can do.

use async_trait::async_trait;
use shared_types::ChainId;

use crate::domain::{TransferInitiation, TransferRecord};

/// Bridge API - inbound port.
#[async_trait]
pub trait BridgeApi: Send + Sync {
    /// Verify the shipment on `source`, record a pending transfer and start
    /// processing it in the background.
    ///
    /// Returns as soon as the transfer is accepted; processing failures are
    /// only visible through [`BridgeApi::get_transfer_status`].
    async fn initiate_transfer(
        &self,
        shipment_id: &str,
        source: &ChainId,
        target: &ChainId,
    ) -> TransferInitiation;

    /// Look up a transfer, pending map first.
    fn get_transfer_status(&self, transfer_id: &str) -> Option<TransferRecord>;

    /// Every transfer of a shipment, oldest first.
    fn transfers_for_shipment(&self, shipment_id: &str) -> Vec<TransferRecord>;

    /// Whether `chain` is configured for transfers.
    fn is_chain_supported(&self, chain: &ChainId) -> bool;
}
