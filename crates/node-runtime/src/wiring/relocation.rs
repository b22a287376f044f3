//! # Relocation Choreography
//!
//! Bridge (3) → Write Batcher (2), through the event bus:
//!
//! ```text
//! TransferCompleted { shipment_id, target_chain, target_tx_hash }
//!     │
//!     ▼
//! apply_relocation(shipment_id, target_chain, target_tx_hash)
//!     │
//!     ▼
//! resubmit(shipment_id)   // unrecorded events now route to target_chain
//! ```
//!
//! `TransferFailed` leaves the shipment where it is and is only logged.

use std::sync::Arc;

use sc_02_write_batcher::{BatcherError, ResubmittedWrite, WriteBatcher};
use shared_bus::{SyncEvent, Subscription};
use shared_types::ChainId;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Result of applying one completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    /// Shipment relocated.
    pub shipment_id: String,
    /// New canonical chain.
    pub chain: ChainId,
    /// Writes re-routed after the move.
    pub resubmitted: Vec<ResubmittedWrite>,
}

/// Applies completed bridge transfers to the write batcher.
pub struct RelocationHandler {
    subscription: Subscription,
    batcher: Arc<WriteBatcher>,
}

impl RelocationHandler {
    /// Create a handler over a bridge-topic subscription.
    ///
    /// Subscribe before the bridge starts: events published earlier are
    /// not replayed.
    pub fn new(subscription: Subscription, batcher: Arc<WriteBatcher>) -> Self {
        Self {
            subscription,
            batcher,
        }
    }

    /// Run until shutdown or until the bus closes.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("[sc-runtime] Relocation handler started");

        loop {
            tokio::select! {
                event = self.subscription.recv() => {
                    let Some(event) = event else {
                        warn!("[sc-runtime] Event bus closed, relocation handler exiting");
                        break;
                    };
                    self.handle(event).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("[sc-runtime] Relocation handler stopped");
    }

    /// Apply a single bus event. Returns the relocation when one happened.
    pub async fn handle(&self, event: SyncEvent) -> Option<Relocation> {
        match event {
            SyncEvent::TransferCompleted {
                transfer_id,
                shipment_id,
                target_chain,
                target_tx_hash,
            } => match relocate(&self.batcher, &shipment_id, target_chain, target_tx_hash).await {
                Ok(relocation) => {
                    info!(
                        transfer_id = %transfer_id,
                        shipment_id = %relocation.shipment_id,
                        chain = %relocation.chain,
                        resubmitted = relocation.resubmitted.len(),
                        "[sc-runtime] 🔀 Shipment relocated"
                    );
                    Some(relocation)
                }
                Err(err) => {
                    error!(
                        transfer_id = %transfer_id,
                        shipment_id = %shipment_id,
                        error = %err,
                        "[sc-runtime] Relocation failed"
                    );
                    None
                }
            },
            SyncEvent::TransferFailed {
                transfer_id,
                shipment_id,
                error,
            } => {
                warn!(
                    transfer_id = %transfer_id,
                    shipment_id = %shipment_id,
                    error = %error,
                    "[sc-runtime] Transfer failed, shipment stays on its source chain"
                );
                None
            }
            other => {
                debug!(topic = ?other.topic(), "[sc-runtime] Ignoring event");
                None
            }
        }
    }
}

/// Point the shipment at `chain` and re-route its unrecorded writes.
pub async fn relocate(
    batcher: &WriteBatcher,
    shipment_id: &str,
    chain: ChainId,
    registration_tx: Option<String>,
) -> Result<Relocation, BatcherError> {
    batcher.apply_relocation(shipment_id, chain.clone(), registration_tx)?;
    let resubmitted = batcher.resubmit(shipment_id).await?;
    Ok(Relocation {
        shipment_id: shipment_id.to_string(),
        chain,
        resubmitted,
    })
}
