//! # Domain Invariants
//!
//! Business rules that must always hold true for shard assignment.

use super::errors::ShardId;

/// Minimum shard count.
pub const MIN_SHARD_COUNT: u16 = 1;

/// Maximum shard count.
pub const MAX_SHARD_COUNT: u16 = 1024;

/// Invariant: Shard assignment is deterministic.
///
/// Same identifier + same shard count = same shard ID.
pub fn invariant_deterministic_assignment<F>(assign_fn: F, id: &str, shard_count: u16) -> bool
where
    F: Fn(&str, u16) -> ShardId,
{
    let first = assign_fn(id, shard_count);
    let second = assign_fn(id, shard_count);
    first == second
}

/// Invariant: Assigned shard lies in `[0, shard_count)`.
pub fn invariant_shard_in_range(shard: ShardId, shard_count: u16) -> bool {
    shard_count > 0 && shard < shard_count
}
