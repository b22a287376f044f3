//! # Inbound Ports
//!
//! API trait defining what the shard assigner can do.

use crate::domain::{ShardConfig, ShardError, ShardId};

/// Sharding API - inbound port.
///
/// Pure and side-effect free; safe to share across threads.
pub trait ShardingApi: Send + Sync {
    /// Shard index for a shipment identifier.
    fn shard_of(&self, id: &str) -> Result<ShardId, ShardError>;

    /// Whether this node owns `shard`.
    fn is_locally_responsible(&self, shard: ShardId) -> bool;

    /// Whether ownership routing is active.
    fn is_enabled(&self) -> bool;

    /// Get total shard count.
    fn shard_count(&self) -> u16;

    /// Get current shard configuration.
    fn config(&self) -> &ShardConfig;
}
