//! # Value Objects
//!
//! Routing decisions and ledger outcomes.

use serde::{Deserialize, Serialize};
use shared_types::ChainId;

use super::errors::BatcherError;

/// How ledger writes are issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    /// Ledger call happens on the request path.
    Synchronous,
    /// Write is queued and issued by the next flush cycle.
    Deferred,
}

impl WriteMode {
    /// Mode implied by a flush interval (`0` forces synchronous writes).
    pub fn from_interval_ms(interval_ms: u64) -> Self {
        if interval_ms == 0 {
            WriteMode::Synchronous
        } else {
            WriteMode::Deferred
        }
    }
}

/// Why a write was not issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoOpReason {
    /// Another node owns the shard; the bridge relocates the record.
    AwaitingBridge,
    /// Another node owns the shard and bridging is disabled.
    Dropped,
}

/// Routing decision for one write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteRoute {
    /// Issue the ledger call now.
    Direct(ChainId),
    /// Queue for the next flush.
    Deferred(ChainId),
    /// Do not write.
    NoOp(NoOpReason),
}

/// Kind of pending ledger call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteTag {
    /// `register_shipment`.
    RegisterShipment,
    /// `record_event`.
    RecordEvent,
}

/// Ledger side of a write, as seen by the caller.
///
/// `blockchain_recorded` on the stored record stays the durable signal;
/// this only reports what happened on this call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerOutcome {
    /// Written synchronously.
    Recorded {
        /// Transaction hash.
        tx_hash: Option<String>,
    },
    /// Queued for the next flush.
    Pending {
        /// Chain the write will address.
        chain: ChainId,
    },
    /// Synchronous write failed. Not retried.
    Failed {
        /// Gateway error.
        error: String,
    },
    /// Waiting for a bridge relocation.
    AwaitingBridge,
    /// Dropped: not responsible and bridging disabled.
    Dropped,
    /// On-chain recording not requested or integration disabled.
    Skipped,
}

impl LedgerOutcome {
    /// Whether the ledger write already landed.
    pub fn is_recorded(&self) -> bool {
        matches!(self, LedgerOutcome::Recorded { .. })
    }

    /// Strict view: only a recorded write is `Ok`.
    pub fn into_result(self) -> Result<Option<String>, BatcherError> {
        match self {
            LedgerOutcome::Recorded { tx_hash } => Ok(tx_hash),
            LedgerOutcome::Failed { error } => Err(BatcherError::WriteFailure(error)),
            LedgerOutcome::Pending { chain } => Err(BatcherError::WriteFailure(format!(
                "write queued for {chain}"
            ))),
            LedgerOutcome::AwaitingBridge => Err(BatcherError::WriteFailure(
                "write awaiting bridge relocation".to_string(),
            )),
            LedgerOutcome::Dropped => Err(BatcherError::WriteFailure(
                "write dropped: shard not owned and bridging disabled".to_string(),
            )),
            LedgerOutcome::Skipped => Err(BatcherError::WriteFailure(
                "on-chain recording skipped".to_string(),
            )),
        }
    }
}
