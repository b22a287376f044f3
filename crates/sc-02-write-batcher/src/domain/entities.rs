//! # Domain Entities
//!
//! Configuration, queued writes and call results for the write batcher.

use serde::{Deserialize, Serialize};
use shared_types::{ChainId, EventRecord, ShipmentId, ShipmentRecord, DEFAULT_TRACKING_PREFIX};

use super::value_objects::{LedgerOutcome, WriteMode, WriteTag};

/// Write batcher configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatcherConfig {
    /// Ledger integration master switch.
    pub blockchain_enabled: bool,
    /// Flush interval in milliseconds; `0` forces synchronous writes.
    pub write_interval_ms: u64,
    /// Chain written when this node is responsible.
    pub primary_chain: ChainId,
    /// Whether unowned writes wait for a bridge relocation.
    pub bridge_enabled: bool,
    /// Prefix for generated tracking numbers.
    pub tracking_prefix: String,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            blockchain_enabled: true,
            write_interval_ms: 5_000,
            primary_chain: ChainId::new("ethereum"),
            bridge_enabled: false,
            tracking_prefix: DEFAULT_TRACKING_PREFIX.to_string(),
        }
    }
}

impl BatcherConfig {
    /// Create config for testing: synchronous writes to `ethereum`.
    pub fn for_testing() -> Self {
        Self {
            write_interval_ms: 0,
            ..Self::default()
        }
    }

    /// Write mode implied by the interval.
    pub fn write_mode(&self) -> WriteMode {
        WriteMode::from_interval_ms(self.write_interval_ms)
    }
}

/// A deferred ledger call.
///
/// Lives only in the in-memory queue; lost if the process dies before the
/// next flush.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingWrite {
    /// Kind of call.
    pub tag: WriteTag,
    /// Owning shipment.
    pub shipment_id: ShipmentId,
    /// Event id for `RecordEvent`.
    pub event_id: Option<String>,
    /// Event type for `RecordEvent`.
    pub event_type: Option<String>,
    /// Digest written to the ledger.
    pub metadata_digest: String,
    /// Chain addressed.
    pub chain: ChainId,
}

impl PendingWrite {
    /// Registration of a shipment.
    pub fn register(shipment: &ShipmentRecord, chain: ChainId) -> Self {
        Self {
            tag: WriteTag::RegisterShipment,
            shipment_id: shipment.id.clone(),
            event_id: None,
            event_type: None,
            metadata_digest: shipment.metadata_digest(),
            chain,
        }
    }

    /// Recording of an event.
    pub fn event(event: &EventRecord, chain: ChainId) -> Self {
        Self {
            tag: WriteTag::RecordEvent,
            shipment_id: event.shipment_id.clone(),
            event_id: Some(event.id.clone()),
            event_type: Some(event.event_type.clone()),
            metadata_digest: event.metadata_digest(),
            chain,
        }
    }

    /// Whether this write targets the given record.
    pub fn targets(&self, shipment_id: &str, event_id: Option<&str>) -> bool {
        self.shipment_id == shipment_id && self.event_id.as_deref() == event_id
    }
}

/// A stored record plus the ledger side of the call that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteReceipt<T> {
    /// Record as persisted after the call.
    pub record: T,
    /// What happened on the ledger side.
    pub ledger: LedgerOutcome,
}

/// One write re-issued by a resubmission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResubmittedWrite {
    /// Event id, `None` for the shipment registration.
    pub event_id: Option<String>,
    /// What happened on the ledger side.
    pub ledger: LedgerOutcome,
}

/// Result of one flush cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    /// Writes taken from the queue.
    pub attempted: usize,
    /// Writes that landed and were applied.
    pub succeeded: usize,
    /// Writes that failed (gateway or persistence).
    pub failed: usize,
    /// Distinct shipments touched.
    pub shipments: usize,
}

impl FlushReport {
    /// Whether the cycle had nothing to do.
    pub fn is_empty(&self) -> bool {
        self.attempted == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_default_config_is_deferred() {
        let config = BatcherConfig::default();
        assert_eq!(config.write_mode(), WriteMode::Deferred);
        assert_eq!(BatcherConfig::for_testing().write_mode(), WriteMode::Synchronous);
    }

    #[test]
    fn test_pending_write_from_records() {
        let shipment = ShipmentRecord::new("S1".into(), json!({"origin": "HCM"}), 2, Utc::now());
        let chain = ChainId::new("ethereum");

        let register = PendingWrite::register(&shipment, chain.clone());
        assert_eq!(register.tag, WriteTag::RegisterShipment);
        assert_eq!(register.metadata_digest, shipment.metadata_digest());
        assert!(register.targets("S1", None));
        assert!(!register.targets("S1", Some("e1")));

        let event = EventRecord {
            id: "e1".into(),
            shipment_id: "S1".into(),
            event_type: "departed".into(),
            location: None,
            payload: json!(null),
            timestamp: Utc::now(),
            blockchain_recorded: false,
            blockchain_tx_hash: None,
        };
        let write = PendingWrite::event(&event, chain);
        assert_eq!(write.event_type.as_deref(), Some("departed"));
        assert!(write.targets("S1", Some("e1")));
    }
}
