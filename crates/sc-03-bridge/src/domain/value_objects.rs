//! # Domain Value Objects
//!
//! Transfer identifiers and the transfer state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Short hex transfer identifier.
pub type TransferId = String;

/// Transfer state machine.
///
/// ```text
/// pending ──► processing ──► completed
///                      └───► failed
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Accepted, target write not started.
    #[default]
    Pending,
    /// Target write in flight.
    Processing,
    /// Target chain holds the record.
    Completed,
    /// Target write failed. Kept for inspection, never retried.
    Failed,
}

impl TransferStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
