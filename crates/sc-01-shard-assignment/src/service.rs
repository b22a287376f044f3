//! # Shard Assigner Service
//!
//! Stateless implementation of [`ShardingApi`] over a validated
//! [`ShardConfig`].

use shared_types::validate_identifier;
use tracing::debug;

use crate::algorithms::assign_shard;
use crate::domain::{ShardConfig, ShardError, ShardId};
use crate::ports::ShardingApi;

/// Maps identifiers to shards and answers local ownership.
#[derive(Clone, Debug)]
pub struct ShardAssigner {
    config: ShardConfig,
}

impl ShardAssigner {
    /// Create an assigner, rejecting inconsistent configuration.
    pub fn new(config: ShardConfig) -> Result<Self, ShardError> {
        config.validate()?;
        debug!(
            enabled = config.enabled,
            shard_count = config.shard_count,
            node_id = %config.node_id,
            owned = config.owners.shards_owned_by(&config.node_id).len(),
            "[sc-01] Shard assigner configured"
        );
        Ok(Self { config })
    }

    /// Shards owned by this node.
    pub fn local_shards(&self) -> Vec<ShardId> {
        self.config.owners.shards_owned_by(&self.config.node_id)
    }
}

impl ShardingApi for ShardAssigner {
    fn shard_of(&self, id: &str) -> Result<ShardId, ShardError> {
        validate_identifier(id)
            .map_err(|issue| ShardError::InvalidIdentifier(issue.describe().to_string()))?;
        Ok(assign_shard(id, self.config.shard_count))
    }

    fn is_locally_responsible(&self, shard: ShardId) -> bool {
        if shard >= self.config.shard_count {
            return false;
        }
        self.config.owners.owner_of(shard) == Some(self.config.node_id.as_str())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn shard_count(&self) -> u16 {
        self.config.shard_count
    }

    fn config(&self) -> &ShardConfig {
        &self.config
    }
}
