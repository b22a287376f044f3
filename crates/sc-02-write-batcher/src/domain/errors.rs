//! # Domain Errors
//!
//! Error types for the write batcher.

use sc_01_shard_assignment::ShardError;
use shared_types::{IdentifierIssue, StoreError};
use thiserror::Error;

/// Write batcher error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatcherError {
    /// Identifier is empty or malformed.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// No shipment with this id.
    #[error("Shipment not found: {0}")]
    ShipmentNotFound(String),

    /// A shipment with this id already exists.
    #[error("Shipment already exists: {0}")]
    ShipmentExists(String),

    /// Ledger write failed.
    #[error("Ledger write failed: {0}")]
    WriteFailure(String),

    /// Record store failed.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl From<StoreError> for BatcherError {
    fn from(err: StoreError) -> Self {
        BatcherError::PersistenceFailure(err.to_string())
    }
}

impl From<IdentifierIssue> for BatcherError {
    fn from(issue: IdentifierIssue) -> Self {
        BatcherError::InvalidIdentifier(issue.describe().to_string())
    }
}

impl From<ShardError> for BatcherError {
    fn from(err: ShardError) -> Self {
        match err {
            ShardError::InvalidIdentifier(reason) => BatcherError::InvalidIdentifier(reason),
            ShardError::ConfigError(reason) => BatcherError::InvalidIdentifier(reason),
        }
    }
}
