//! # Domain Invariants
//!
//! Rules every stored transfer must satisfy.

use super::book::TransferBook;
use super::entities::TransferRecord;
use super::value_objects::TransferStatus;

/// Invariant: terminal records carry their outcome.
///
/// Completed has a target hash, failed has a non-empty error, and both
/// are stamped with a completion time.
pub fn invariant_terminal_outcome(record: &TransferRecord) -> bool {
    match record.status {
        TransferStatus::Completed => record.target_tx_hash.is_some() && record.completed_at.is_some(),
        TransferStatus::Failed => {
            record.error.as_deref().is_some_and(|e| !e.is_empty()) && record.completed_at.is_some()
        }
        TransferStatus::Pending | TransferStatus::Processing => record.completed_at.is_none(),
    }
}

/// Invariant: the confirmed map holds only completed transfers, and no id
/// appears in both maps.
pub fn invariant_book_partition(book: &TransferBook) -> bool {
    book.confirmed()
        .all(|record| record.status == TransferStatus::Completed && !book.is_pending(&record.id))
}
