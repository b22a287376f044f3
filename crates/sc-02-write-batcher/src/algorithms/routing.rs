//! # Write Routing
//!
//! The single decision point for every ledger write, shipment registration
//! and event recording alike:
//!
//! 1. Relocated shipment → its target chain.
//! 2. Sharding disabled → primary chain.
//! 3. Sharding enabled and shard owned locally → primary chain.
//! 4. Shard owned elsewhere → wait for the bridge, or drop when bridging
//!    is disabled.
//!
//! A chain decision becomes `Direct` or `Deferred` according to the
//! configured write mode.

use sc_01_shard_assignment::{ShardId, ShardingApi};
use shared_types::ChainId;

use crate::domain::{BatcherConfig, NoOpReason, WriteMode, WriteRoute};

/// Decide how a write for a shipment in `shard` is issued.
pub fn route_write(
    sharding: &dyn ShardingApi,
    config: &BatcherConfig,
    shard: ShardId,
    relocated_to: Option<&ChainId>,
) -> WriteRoute {
    let chain = match relocated_to {
        Some(target) => target.clone(),
        None if !sharding.is_enabled() || sharding.is_locally_responsible(shard) => {
            config.primary_chain.clone()
        }
        None if config.bridge_enabled => return WriteRoute::NoOp(NoOpReason::AwaitingBridge),
        None => return WriteRoute::NoOp(NoOpReason::Dropped),
    };

    match config.write_mode() {
        WriteMode::Synchronous => WriteRoute::Direct(chain),
        WriteMode::Deferred => WriteRoute::Deferred(chain),
    }
}
