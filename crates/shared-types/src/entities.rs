//! # Core Entities
//!
//! Shipment and event records shared by every subsystem. The write batcher
//! is the only owner that mutates them; everyone else reads snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::digest::metadata_digest;

/// Shard index (u16 supports up to 65536 shards).
pub type ShardId = u16;

/// Opaque shipment identifier.
pub type ShipmentId = String;

/// Ledger (chain) identifier, e.g. `ethereum` or `polygon`.
///
/// Chain names are configuration, not a closed set, so this is a
/// normalized string rather than an enum.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Create a chain id. Names are trimmed and lower-cased.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    /// Borrow the chain name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ChainId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A tracked consignment with an append-only event history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    /// Shipment identifier (tracking number when generated).
    pub id: ShipmentId,
    /// Free-form descriptive fields.
    pub details: Value,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Event ids in append order.
    pub event_ids: Vec<String>,
    /// Set once a ledger write succeeded. Never reset.
    pub blockchain_recorded: bool,
    /// Transaction hash of the successful ledger write.
    pub blockchain_tx_hash: Option<String>,
    /// Shard assigned at creation. Immutable.
    pub shard_id: ShardId,
    /// Chain the canonical record was relocated to, if any.
    pub target_chain: Option<ChainId>,
}

impl ShipmentRecord {
    /// Create an unrecorded shipment.
    pub fn new(id: ShipmentId, details: Value, shard_id: ShardId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            details,
            created_at,
            event_ids: Vec::new(),
            blockchain_recorded: false,
            blockchain_tx_hash: None,
            shard_id,
            target_chain: None,
        }
    }

    /// Mark the ledger write as successful.
    pub fn mark_recorded(&mut self, tx_hash: Option<String>) {
        self.blockchain_recorded = true;
        if tx_hash.is_some() {
            self.blockchain_tx_hash = tx_hash;
        }
    }

    /// The payload whose digest is written to the ledger.
    pub fn metadata(&self) -> Value {
        json!({
            "id": self.id,
            "details": self.details,
            "created_at": self.created_at.to_rfc3339(),
            "shard_id": self.shard_id,
        })
    }

    /// SHA-256 digest of [`Self::metadata`].
    pub fn metadata_digest(&self) -> String {
        metadata_digest(&self.metadata())
    }
}

/// An immutable event appended to a shipment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event identifier.
    pub id: String,
    /// Owning shipment.
    pub shipment_id: ShipmentId,
    /// Event type, e.g. `departed` or `customs_cleared`.
    pub event_type: String,
    /// Where the event happened.
    pub location: Option<String>,
    /// Arbitrary payload.
    pub payload: Value,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Set once a ledger write succeeded. Never reset.
    pub blockchain_recorded: bool,
    /// Transaction hash of the successful ledger write.
    pub blockchain_tx_hash: Option<String>,
}

impl EventRecord {
    /// Mark the ledger write as successful.
    pub fn mark_recorded(&mut self, tx_hash: Option<String>) {
        self.blockchain_recorded = true;
        if tx_hash.is_some() {
            self.blockchain_tx_hash = tx_hash;
        }
    }

    /// The payload whose digest is written to the ledger.
    pub fn metadata(&self) -> Value {
        json!({
            "id": self.id,
            "shipment_id": self.shipment_id,
            "event_type": self.event_type,
            "location": self.location,
            "payload": self.payload,
            "timestamp": self.timestamp.to_rfc3339(),
        })
    }

    /// SHA-256 digest of [`Self::metadata`].
    pub fn metadata_digest(&self) -> String {
        metadata_digest(&self.metadata())
    }
}

/// Input for shipment creation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewShipment {
    /// Caller-supplied id. A tracking number is generated when absent.
    pub id: Option<ShipmentId>,
    /// Free-form descriptive fields.
    pub details: Value,
}

impl NewShipment {
    /// Shipment with an explicit id.
    pub fn with_id(id: impl Into<String>, details: Value) -> Self {
        Self {
            id: Some(id.into()),
            details,
        }
    }
}

/// Input for event recording.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewEvent {
    /// Event type.
    pub event_type: String,
    /// Where the event happened.
    pub location: Option<String>,
    /// Arbitrary payload.
    pub payload: Value,
    /// Event time; defaults to now.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewEvent {
    /// Event of the given type with an empty payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            location: None,
            payload: Value::Null,
            timestamp: None,
        }
    }

    /// Set the location.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}
