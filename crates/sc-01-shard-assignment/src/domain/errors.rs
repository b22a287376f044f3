//! # Domain Errors
//!
//! Error types for the shard assigner.

use thiserror::Error;

pub use shared_types::ShardId;

/// Local node identity as it appears in the ownership table.
pub type NodeId = String;

/// Shard assignment error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShardError {
    /// Identifier is empty or malformed.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
