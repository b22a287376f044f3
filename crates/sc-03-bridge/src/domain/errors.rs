//! # Domain Errors
//!
//! Error types for the bridge coordinator.

use shared_types::{IdentifierIssue, StoreError};
use thiserror::Error;

use super::value_objects::TransferStatus;

/// Bridge error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Identifier is empty or malformed.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Bridging is switched off.
    #[error("Bridge is disabled")]
    BridgeDisabled,

    /// Chain is not configured or not enabled.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    /// Source and target are the same chain.
    #[error("Source and target chain are both {0}")]
    SameChain(String),

    /// Source chain has no record of the shipment.
    #[error("Shipment {shipment_id} not found on {chain}")]
    ShipmentNotFoundOnSource {
        /// Shipment looked up.
        shipment_id: String,
        /// Chain queried.
        chain: String,
    },

    /// No transfer with this id.
    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    /// Status edge outside pending → processing → completed | failed.
    #[error("Invalid transfer transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: TransferStatus,
        /// Attempted status
        to: TransferStatus,
    },

    /// Record store failed.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl From<StoreError> for BridgeError {
    fn from(err: StoreError) -> Self {
        BridgeError::PersistenceFailure(err.to_string())
    }
}

impl From<IdentifierIssue> for BridgeError {
    fn from(issue: IdentifierIssue) -> Self {
        BridgeError::InvalidIdentifier(issue.describe().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_on_source_message() {
        let err = BridgeError::ShipmentNotFoundOnSource {
            shipment_id: "S1".into(),
            chain: "ethereum".into(),
        };
        assert_eq!(err.to_string(), "Shipment S1 not found on ethereum");
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = BridgeError::InvalidTransition {
            from: TransferStatus::Completed,
            to: TransferStatus::Processing,
        };
        assert_eq!(err.to_string(), "Invalid transfer transition: completed -> processing");
    }

    #[test]
    fn test_from_store_error() {
        let err: BridgeError = StoreError::Unavailable("down".into()).into();
        assert!(matches!(err, BridgeError::PersistenceFailure(_)));
    }
}
