//! # Outbound Ports
//!
//! Dependencies injected into the write batcher. The ledger and store
//! ports are shared with the bridge and defined in `shared-types`.

pub use sc_01_shard_assignment::ShardingApi;
pub use shared_bus::EventPublisher;
pub use shared_types::{LedgerGateway, RecordStore};
