//! # Simulated Ledger
//!
//! In-process [`LedgerGateway`] with one append-only log per configured
//! chain. Used when no chain client is linked into the node; transaction
//! hashes are derived from the write so restarts reproduce them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::json;
use sha2::{Digest, Sha256};
use shared_types::{ChainId, LedgerError, LedgerGateway, LedgerReceipt, ShipmentVerification};
use tracing::debug;

use crate::container::config::ChainEndpoint;

#[derive(Debug, Clone)]
struct Registration {
    metadata_digest: String,
    tx_hash: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ChainLog {
    endpoint: String,
    registrations: HashMap<String, Registration>,
    writes: u64,
}

/// Ledger simulation over the node's configured chains.
pub struct SimulatedLedger {
    chains: RwLock<HashMap<ChainId, ChainLog>>,
}

impl SimulatedLedger {
    /// One log per enabled endpoint. Disabled endpoints are unavailable.
    pub fn new(endpoints: &[ChainEndpoint]) -> Self {
        let chains = endpoints
            .iter()
            .filter(|e| e.enabled)
            .map(|e| {
                (
                    e.chain.clone(),
                    ChainLog {
                        endpoint: e.endpoint.clone(),
                        ..ChainLog::default()
                    },
                )
            })
            .collect();
        Self {
            chains: RwLock::new(chains),
        }
    }

    /// Whether writes to `chain` are accepted.
    pub fn is_available(&self, chain: &ChainId) -> bool {
        self.chains.read().contains_key(chain)
    }

    /// Endpoint configured for `chain`.
    pub fn endpoint(&self, chain: &ChainId) -> Option<String> {
        self.chains.read().get(chain).map(|log| log.endpoint.clone())
    }

    /// Writes accepted by `chain` so far.
    pub fn write_count(&self, chain: &ChainId) -> u64 {
        self.chains.read().get(chain).map_or(0, |log| log.writes)
    }

    fn tx_hash(chain: &ChainId, sequence: u64, parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(chain.as_str().as_bytes());
        hasher.update(sequence.to_le_bytes());
        for part in parts {
            hasher.update(b"|");
            hasher.update(part.as_bytes());
        }
        format!("0x{}", hex::encode(hasher.finalize()))
    }

    fn write(
        &self,
        chain: &ChainId,
        shipment_id: &str,
        apply: impl FnOnce(&mut ChainLog, String) -> Result<(), LedgerError>,
        parts: &[&str],
    ) -> LedgerReceipt {
        let mut chains = self.chains.write();
        let Some(log) = chains.get_mut(chain) else {
            return LedgerReceipt::from(Err(LedgerError::ChainUnavailable(chain.to_string())));
        };

        let tx_hash = Self::tx_hash(chain, log.writes, parts);
        match apply(log, tx_hash.clone()) {
            Ok(()) => {
                log.writes += 1;
                debug!(chain = %chain, shipment_id, tx_hash = %tx_hash, "[sim-ledger] write accepted");
                LedgerReceipt::confirmed(tx_hash)
            }
            Err(err) => LedgerReceipt::from(Err(err)),
        }
    }
}

#[async_trait]
impl LedgerGateway for SimulatedLedger {
    async fn register_shipment(
        &self,
        shipment_id: &str,
        metadata_digest: &str,
        chain: &ChainId,
    ) -> LedgerReceipt {
        self.write(
            chain,
            shipment_id,
            |log, tx_hash| {
                if log.registrations.contains_key(shipment_id) {
                    return Err(LedgerError::Rejected(format!(
                        "shipment {shipment_id} already registered"
                    )));
                }
                log.registrations.insert(
                    shipment_id.to_string(),
                    Registration {
                        metadata_digest: metadata_digest.to_string(),
                        tx_hash,
                        timestamp: Utc::now(),
                    },
                );
                Ok(())
            },
            &["register", shipment_id, metadata_digest],
        )
    }

    async fn record_event(
        &self,
        shipment_id: &str,
        event_type: &str,
        metadata_digest: &str,
        chain: &ChainId,
    ) -> LedgerReceipt {
        self.write(
            chain,
            shipment_id,
            |log, _| {
                if !log.registrations.contains_key(shipment_id) {
                    return Err(LedgerError::Rejected(format!(
                        "shipment {shipment_id} is not registered"
                    )));
                }
                Ok(())
            },
            &["event", shipment_id, event_type, metadata_digest],
        )
    }

    async fn verify_shipment(&self, shipment_id: &str, chain: &ChainId) -> ShipmentVerification {
        let chains = self.chains.read();
        let Some(log) = chains.get(chain) else {
            return ShipmentVerification::failed(
                LedgerError::ChainUnavailable(chain.to_string()).to_string(),
            );
        };

        match log.registrations.get(shipment_id) {
            Some(registration) => ShipmentVerification::found(
                json!({
                    "shipment_id": shipment_id,
                    "metadata_digest": registration.metadata_digest,
                    "tx_hash": registration.tx_hash,
                }),
                format!("sim:{chain}"),
                registration.timestamp,
            ),
            None => ShipmentVerification::not_found(),
        }
    }
}
