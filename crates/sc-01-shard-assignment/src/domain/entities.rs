//! # Domain Entities
//!
//! Shard assigner configuration.

use serde::{Deserialize, Serialize};

use super::errors::{NodeId, ShardError};
use super::invariants::{MAX_SHARD_COUNT, MIN_SHARD_COUNT};
use super::value_objects::OwnershipTable;

/// Shard configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShardConfig {
    /// Whether writes are routed by shard ownership.
    pub enabled: bool,
    /// Total number of shards.
    pub shard_count: u16,
    /// Identity of this node in the ownership table.
    pub node_id: NodeId,
    /// Shard ownership.
    pub owners: OwnershipTable,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            shard_count: 16,
            node_id: "node-0".to_string(),
            owners: OwnershipTable::single_owner("node-0", 16),
        }
    }
}

impl ShardConfig {
    /// Create config for testing: 4 shards, `node-a` owns 0-1, `node-b` owns 2-3.
    pub fn for_testing() -> Self {
        Self {
            enabled: true,
            shard_count: 4,
            node_id: "node-a".to_string(),
            owners: OwnershipTable::new()
                .assign(0, "node-a")
                .assign(1, "node-a")
                .assign(2, "node-b")
                .assign(3, "node-b"),
        }
    }

    /// Sharding enabled with `node_id` owning every shard.
    pub fn single_node(node_id: &str, shard_count: u16) -> Self {
        Self {
            enabled: true,
            shard_count,
            node_id: node_id.to_string(),
            owners: OwnershipTable::single_owner(node_id, shard_count),
        }
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), ShardError> {
        if self.shard_count < MIN_SHARD_COUNT || self.shard_count > MAX_SHARD_COUNT {
            return Err(ShardError::ConfigError(format!(
                "shard_count must be within {MIN_SHARD_COUNT}..={MAX_SHARD_COUNT}, got {}",
                self.shard_count
            )));
        }
        if let Some(max) = self.owners.max_shard() {
            if max >= self.shard_count {
                return Err(ShardError::ConfigError(format!(
                    "ownership table names shard {max} but shard_count is {}",
                    self.shard_count
                )));
            }
        }
        if self.enabled && self.node_id.trim().is_empty() {
            return Err(ShardError::ConfigError(
                "node_id is required when sharding is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
