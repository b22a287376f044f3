//! # Integration Tests
//!
//! Cross-subsystem flows over the in-memory store, the mock ledger
//! gateway and, for the runtime flows, the production adapters.

pub mod bridge_flows;
pub mod runtime_flows;
pub mod sync_flows;

use sc_01_shard_assignment::{assign_shard, ShardId};

/// First id `prefix-N` whose shard satisfies `pred`.
pub fn id_in_shard(prefix: &str, shard_count: u16, pred: impl Fn(ShardId) -> bool) -> String {
    (0..10_000)
        .map(|n| format!("{prefix}-{n}"))
        .find(|id| pred(assign_shard(id, shard_count)))
        .unwrap_or_else(|| panic!("no id with a matching shard for {prefix}"))
}

/// Poll `check` until it holds, yielding to spawned tasks in between.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..500 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    check()
}
