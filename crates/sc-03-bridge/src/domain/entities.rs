//! # Domain Entities
//!
//! Bridge configuration, transfer records and initiation results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{ChainId, ShipmentId};
use std::collections::BTreeSet;

use super::errors::BridgeError;
use super::value_objects::{TransferId, TransferStatus};

/// Bridge configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Master switch.
    pub enabled: bool,
    /// Chains transfers may use (enabled chains only).
    pub chains: BTreeSet<ChainId>,
    /// Interval of the periodic snapshot of both transfer maps; `0` disables it.
    pub persist_interval_ms: u64,
    /// Validator quorum. Accepted for configuration compatibility, not consumed.
    pub verification_threshold: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            chains: BTreeSet::from([ChainId::new("ethereum"), ChainId::new("polygon")]),
            persist_interval_ms: 30_000,
            verification_threshold: 1,
        }
    }
}

impl BridgeConfig {
    /// Create config for testing: enabled, `ethereum` and `polygon`.
    pub fn for_testing() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Whether `chain` is configured.
    pub fn is_supported(&self, chain: &ChainId) -> bool {
        self.chains.contains(chain)
    }
}

/// A shipment relocation from one chain to another.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Transfer id.
    pub id: TransferId,
    /// Shipment being relocated.
    pub shipment_id: ShipmentId,
    /// Chain the shipment was verified on.
    pub source_chain: ChainId,
    /// Chain receiving the record.
    pub target_chain: ChainId,
    /// Current status.
    pub status: TransferStatus,
    /// Acceptance time.
    pub initiated_at: DateTime<Utc>,
    /// Time the transfer reached a terminal status.
    pub completed_at: Option<DateTime<Utc>>,
    /// Source-chain metadata captured at initiation; written to the target as is.
    pub metadata_snapshot: Value,
    /// Source registration transaction, when the source chain reports one.
    pub source_tx_hash: Option<String>,
    /// Target registration transaction.
    pub target_tx_hash: Option<String>,
    /// Failure reason.
    pub error: Option<String>,
}

impl TransferRecord {
    /// New record in `pending`.
    pub fn new(
        id: TransferId,
        shipment_id: ShipmentId,
        source_chain: ChainId,
        target_chain: ChainId,
        metadata_snapshot: Value,
        initiated_at: DateTime<Utc>,
    ) -> Self {
        let source_tx_hash = metadata_snapshot
            .get("tx_hash")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self {
            id,
            shipment_id,
            source_chain,
            target_chain,
            status: TransferStatus::Pending,
            initiated_at,
            completed_at: None,
            metadata_snapshot,
            source_tx_hash,
            target_tx_hash: None,
            error: None,
        }
    }

    /// Move to `next`, stamping `completed_at` on terminal states.
    pub fn transition_to(&mut self, next: TransferStatus, now: DateTime<Utc>) -> Result<(), BridgeError> {
        if !self.status.can_transition_to(next) {
            return Err(BridgeError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        Ok(())
    }

    /// Digest registered on the target chain.
    ///
    /// The source chain's own digest when the snapshot carries one, so both
    /// chains hold the same fingerprint.
    pub fn target_digest(&self) -> String {
        self.metadata_snapshot
            .get("metadata_digest")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| shared_types::metadata_digest(&self.metadata_snapshot))
    }
}

/// Caller-facing result of `initiate_transfer`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferInitiation {
    /// Whether the transfer was accepted.
    pub success: bool,
    /// Transfer id when accepted.
    pub transfer_id: Option<TransferId>,
    /// Rejection reason.
    pub error: Option<String>,
}

impl TransferInitiation {
    /// Accepted transfer.
    pub fn accepted(transfer_id: TransferId) -> Self {
        Self {
            success: true,
            transfer_id: Some(transfer_id),
            error: None,
        }
    }

    /// Rejected transfer.
    pub fn rejected(err: &BridgeError) -> Self {
        Self {
            success: false,
            transfer_id: None,
            error: Some(err.to_string()),
        }
    }
}

impl From<Result<TransferId, BridgeError>> for TransferInitiation {
    fn from(result: Result<TransferId, BridgeError>) -> Self {
        match result {
            Ok(id) => Self::accepted(id),
            Err(err) => Self::rejected(&err),
        }
    }
}

/// Counts loaded by a recovery.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecoveredTransfers {
    /// Records restored to the pending map.
    pub pending: usize,
    /// Records restored to the confirmed map.
    pub confirmed: usize,
}
