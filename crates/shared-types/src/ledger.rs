//! # Ledger Gateway Port
//!
//! Outbound port to an external append-only ledger. Every operation is
//! addressed to a named chain and reports failure through its result
//! object rather than through `Err`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

use crate::entities::ChainId;
use crate::errors::LedgerError;

/// Outcome of a ledger write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// Whether the write landed.
    pub success: bool,
    /// Transaction hash on success.
    pub tx_hash: Option<String>,
    /// Failure description.
    pub error: Option<String>,
}

impl LedgerReceipt {
    /// Successful write.
    pub fn confirmed(tx_hash: impl Into<String>) -> Self {
        Self {
            success: true,
            tx_hash: Some(tx_hash.into()),
            error: None,
        }
    }

    /// Failed write.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tx_hash: None,
            error: Some(error.into()),
        }
    }
}

impl From<Result<String, LedgerError>> for LedgerReceipt {
    fn from(result: Result<String, LedgerError>) -> Self {
        match result {
            Ok(tx_hash) => Self::confirmed(tx_hash),
            Err(err) => Self::failed(err.to_string()),
        }
    }
}

/// Answer to "is this shipment registered on that chain?".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShipmentVerification {
    /// Whether the shipment is registered.
    pub exists: bool,
    /// Registered metadata (contains `metadata_digest`).
    pub metadata: Option<Value>,
    /// Registering account.
    pub registered_by: Option<String>,
    /// Registration time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Lookup failure, distinct from "not found".
    pub error: Option<String>,
}

impl ShipmentVerification {
    /// Shipment is registered.
    pub fn found(metadata: Value, registered_by: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            exists: true,
            metadata: Some(metadata),
            registered_by: Some(registered_by.into()),
            timestamp: Some(timestamp),
            error: None,
        }
    }

    /// Shipment is not registered.
    pub fn not_found() -> Self {
        Self {
            exists: false,
            metadata: None,
            registered_by: None,
            timestamp: None,
            error: None,
        }
    }

    /// Lookup failed.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::not_found()
        }
    }
}

/// Ledger gateway port.
///
/// Implementations must be safe to call concurrently.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Register a shipment's metadata digest on `chain`.
    async fn register_shipment(
        &self,
        shipment_id: &str,
        metadata_digest: &str,
        chain: &ChainId,
    ) -> LedgerReceipt;

    /// Record an event digest for a shipment on `chain`.
    async fn record_event(
        &self,
        shipment_id: &str,
        event_type: &str,
        metadata_digest: &str,
        chain: &ChainId,
    ) -> LedgerReceipt;

    /// Look up a shipment's registration on `chain`.
    async fn verify_shipment(&self, shipment_id: &str, chain: &ChainId) -> ShipmentVerification;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// A call observed by [`MockLedgerGateway`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    /// `register_shipment`.
    RegisterShipment {
        /// Shipment.
        shipment_id: String,
        /// Digest written.
        metadata_digest: String,
        /// Chain addressed.
        chain: ChainId,
    },
    /// `record_event`.
    RecordEvent {
        /// Shipment.
        shipment_id: String,
        /// Event type.
        event_type: String,
        /// Digest written.
        metadata_digest: String,
        /// Chain addressed.
        chain: ChainId,
    },
    /// `verify_shipment`.
    VerifyShipment {
        /// Shipment.
        shipment_id: String,
        /// Chain addressed.
        chain: ChainId,
    },
}

impl GatewayCall {
    /// Chain the call addressed.
    pub fn chain(&self) -> &ChainId {
        match self {
            Self::RegisterShipment { chain, .. }
            | Self::RecordEvent { chain, .. }
            | Self::VerifyShipment { chain, .. } => chain,
        }
    }

    /// Shipment the call addressed.
    pub fn shipment_id(&self) -> &str {
        match self {
            Self::RegisterShipment { shipment_id, .. }
            | Self::RecordEvent { shipment_id, .. }
            | Self::VerifyShipment { shipment_id, .. } => shipment_id,
        }
    }
}

#[derive(Clone, Debug)]
struct Registration {
    metadata_digest: String,
    timestamp: DateTime<Utc>,
}

#[derive(Default)]
struct FailurePlan {
    shipments: HashSet<String>,
    event_types: HashSet<String>,
    chains: HashSet<ChainId>,
}

/// In-memory ledger with failure injection and a call gate.
///
/// Writes to any chain succeed unless a failure rule matches. While the
/// gate is closed, write calls park until [`MockLedgerGateway::open_gate`];
/// verification is never gated.
pub struct MockLedgerGateway {
    registrations: RwLock<HashMap<(ChainId, String), Registration>>,
    calls: Mutex<Vec<GatewayCall>>,
    failures: RwLock<FailurePlan>,
    scripted_hashes: Mutex<VecDeque<String>>,
    tx_counter: AtomicU64,
    gate: watch::Sender<bool>,
}

impl MockLedgerGateway {
    /// Account name reported in verifications.
    pub const ACCOUNT: &'static str = "mock-ledger";

    /// Create an open, always-succeeding mock.
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            registrations: RwLock::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failures: RwLock::new(FailurePlan::default()),
            scripted_hashes: Mutex::new(VecDeque::new()),
            tx_counter: AtomicU64::new(0),
            gate,
        }
    }

    /// Register a shipment directly, without recording a call.
    pub fn preregister(&self, chain: &ChainId, shipment_id: &str, metadata_digest: &str) {
        self.registrations.write().insert(
            (chain.clone(), shipment_id.to_string()),
            Registration {
                metadata_digest: metadata_digest.to_string(),
                timestamp: Utc::now(),
            },
        );
    }

    /// Fail every write for this shipment.
    pub fn fail_shipment(&self, shipment_id: &str) {
        self.failures.write().shipments.insert(shipment_id.to_string());
    }

    /// Fail every `record_event` with this event type.
    pub fn fail_event_type(&self, event_type: &str) {
        self.failures.write().event_types.insert(event_type.to_string());
    }

    /// Fail every call addressed to this chain.
    pub fn fail_chain(&self, chain: &ChainId) {
        self.failures.write().chains.insert(chain.clone());
    }

    /// Remove all failure rules.
    pub fn clear_failures(&self) {
        *self.failures.write() = FailurePlan::default();
    }

    /// Hash returned by the next successful write.
    pub fn push_tx_hash(&self, tx_hash: impl Into<String>) {
        self.scripted_hashes.lock().push_back(tx_hash.into());
    }

    /// Park all subsequent write calls until the gate opens.
    pub fn close_gate(&self) {
        self.gate.send_replace(false);
    }

    /// Release parked calls.
    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    /// All calls observed so far.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().clone()
    }

    /// Number of write calls (register + record) observed.
    pub fn write_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| !matches!(call, GatewayCall::VerifyShipment { .. }))
            .count()
    }

    /// Whether the shipment is registered on `chain`.
    pub fn is_registered(&self, chain: &ChainId, shipment_id: &str) -> bool {
        self.registrations
            .read()
            .contains_key(&(chain.clone(), shipment_id.to_string()))
    }

    async fn pass_gate(&self) {
        let mut rx = self.gate.subscribe();
        let _ = rx.wait_for(|open| *open).await;
    }

    fn next_tx_hash(&self) -> String {
        if let Some(scripted) = self.scripted_hashes.lock().pop_front() {
            return scripted;
        }
        let n = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("0x{n:064x}")
    }

    fn write_failure(&self, shipment_id: &str, event_type: Option<&str>, chain: &ChainId) -> Option<LedgerError> {
        let plan = self.failures.read();
        if plan.chains.contains(chain) {
            return Some(LedgerError::Unreachable(chain.to_string()));
        }
        if plan.shipments.contains(shipment_id) {
            return Some(LedgerError::Rejected(format!("shipment {shipment_id}")));
        }
        if let Some(event_type) = event_type {
            if plan.event_types.contains(event_type) {
                return Some(LedgerError::Rejected(format!("event {event_type}")));
            }
        }
        None
    }
}

impl Default for MockLedgerGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerGateway for MockLedgerGateway {
    async fn register_shipment(
        &self,
        shipment_id: &str,
        metadata_digest: &str,
        chain: &ChainId,
    ) -> LedgerReceipt {
        self.calls.lock().push(GatewayCall::RegisterShipment {
            shipment_id: shipment_id.to_string(),
            metadata_digest: metadata_digest.to_string(),
            chain: chain.clone(),
        });
        self.pass_gate().await;

        if let Some(err) = self.write_failure(shipment_id, None, chain) {
            return LedgerReceipt::from(Err(err));
        }
        self.preregister(chain, shipment_id, metadata_digest);
        LedgerReceipt::confirmed(self.next_tx_hash())
    }

    async fn record_event(
        &self,
        shipment_id: &str,
        event_type: &str,
        metadata_digest: &str,
        chain: &ChainId,
    ) -> LedgerReceipt {
        self.calls.lock().push(GatewayCall::RecordEvent {
            shipment_id: shipment_id.to_string(),
            event_type: event_type.to_string(),
            metadata_digest: metadata_digest.to_string(),
            chain: chain.clone(),
        });
        self.pass_gate().await;

        match self.write_failure(shipment_id, Some(event_type), chain) {
            Some(err) => LedgerReceipt::from(Err(err)),
            None => LedgerReceipt::confirmed(self.next_tx_hash()),
        }
    }

    async fn verify_shipment(&self, shipment_id: &str, chain: &ChainId) -> ShipmentVerification {
        self.calls.lock().push(GatewayCall::VerifyShipment {
            shipment_id: shipment_id.to_string(),
            chain: chain.clone(),
        });

        if self.failures.read().chains.contains(chain) {
            return ShipmentVerification::failed(LedgerError::Unreachable(chain.to_string()).to_string());
        }

        let registrations = self.registrations.read();
        match registrations.get(&(chain.clone(), shipment_id.to_string())) {
            Some(entry) => ShipmentVerification::found(
                json!({ "shipment_id": shipment_id, "metadata_digest": entry.metadata_digest }),
                Self::ACCOUNT,
                entry.timestamp,
            ),
            None => ShipmentVerification::not_found(),
        }
    }
}
