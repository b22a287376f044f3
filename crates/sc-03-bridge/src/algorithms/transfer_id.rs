//! # Transfer Id Derivation
//!
//! SHA-256 over `shipment|source|target|unix_millis|sequence`, hex encoded
//! and cut to [`TRANSFER_ID_LEN`] characters. The sequence is a
//! process-local counter, so two transfers of the same shipment in the
//! same millisecond still get different ids. Truncation keeps a residual
//! collision chance; callers re-draw against known ids.

use sha2::{Digest, Sha256};
use shared_types::ChainId;

use crate::domain::TransferId;

/// Length of a transfer id in hex characters.
pub const TRANSFER_ID_LEN: usize = 16;

/// Derive a transfer id.
pub fn derive_transfer_id(
    shipment_id: &str,
    source: &ChainId,
    target: &ChainId,
    unix_millis: i64,
    sequence: u64,
) -> TransferId {
    let mut hasher = Sha256::new();
    hasher.update(format!("{shipment_id}|{source}|{target}|{unix_millis}|{sequence}").as_bytes());
    let mut id = hex::encode(hasher.finalize());
    id.truncate(TRANSFER_ID_LEN);
    id
}
