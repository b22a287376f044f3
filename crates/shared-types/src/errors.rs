//! # Error Types
//!
//! Errors for the two external collaborators shared by every subsystem.

use thiserror::Error;

/// Errors raised by a [`crate::RecordStore`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Underlying I/O failed.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Store refused the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Transport-level ledger errors.
///
/// Gateways fold these into the `error` field of their result objects;
/// they never surface as `Err` through the gateway port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Chain is not configured or disabled.
    #[error("Chain {0} is not available")]
    ChainUnavailable(String),

    /// Node could not be reached.
    #[error("Ledger unreachable: {0}")]
    Unreachable(String),

    /// Ledger rejected the write.
    #[error("Ledger rejected write: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Io {
            message: "disk full".to_string(),
        };
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_store_error_from_json() {
        let err: StoreError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_ledger_error_display() {
        let err = LedgerError::ChainUnavailable("polygon".to_string());
        assert_eq!(err.to_string(), "Chain polygon is not available");
    }
}
