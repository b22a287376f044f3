//! # Subsystem Container
//!
//! Holds all subsystem instances and the adapters behind their ports.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Record store (data-dir lock), ledger, event bus
//! Level 1: Shard assigner (pure)
//! Level 2: Write batcher (sharding, ledger, store, bus)
//! Level 3: Bridge coordinator (ledger, store, bus)
//! ```
//!
//! The batcher and the bridge never call each other. Relocation after a
//! completed transfer is driven by the runtime through the event bus.

use std::sync::Arc;

use sc_01_shard_assignment::{ShardAssigner, ShardError};
use sc_02_write_batcher::WriteBatcher;
use sc_03_bridge::BridgeCoordinator;
use shared_bus::InMemoryEventBus;
use shared_types::{LedgerGateway, RecordStore};
use thiserror::Error;
use tracing::{info, instrument};

use crate::adapters::{FileBackedRecordStore, LockError, SimulatedLedger};
use crate::container::config::NodeConfig;

/// Errors while assembling the container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The record store could not be opened.
    #[error("Record store: {0}")]
    Store(#[from] LockError),

    /// The shard assigner rejected its configuration.
    #[error("Sharding: {0}")]
    Sharding(#[from] ShardError),
}

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    /// Shard assigner (Subsystem 1).
    pub sharding: Arc<ShardAssigner>,

    /// Write batcher (Subsystem 2).
    pub batcher: Arc<WriteBatcher>,

    /// Bridge coordinator (Subsystem 3).
    pub bridge: Arc<BridgeCoordinator>,

    /// Event bus shared by all subsystems.
    pub event_bus: Arc<InMemoryEventBus>,

    /// Ledger gateway.
    pub ledger: Arc<dyn LedgerGateway>,

    /// Record store.
    pub store: Arc<dyn RecordStore>,

    /// Node configuration (immutable after initialization).
    pub config: NodeConfig,
}

impl SubsystemContainer {
    /// Build the container with the production adapters: a file-backed
    /// store under `storage.data_dir` and a simulated ledger over the
    /// configured chains.
    #[instrument(name = "subsystem_init", skip(config))]
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        info!("Phase 0: Opening record store at {}", config.storage.data_dir.display());
        let store: Arc<dyn RecordStore> =
            Arc::new(FileBackedRecordStore::open(&config.storage.data_dir)?);
        let ledger: Arc<dyn LedgerGateway> = Arc::new(SimulatedLedger::new(&config.chains));
        Self::with_adapters(config, ledger, store)
    }

    /// Build the container over caller-supplied adapters.
    pub fn with_adapters(
        config: NodeConfig,
        ledger: Arc<dyn LedgerGateway>,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, ContainerError> {
        let event_bus = Arc::new(InMemoryEventBus::new());

        info!("Phase 1: Initializing shard assigner");
        let sharding = Arc::new(ShardAssigner::new(config.sharding.clone())?);
        info!(
            "  [1] Shard assigner ready (enabled={}, shards={}, node={})",
            config.sharding.enabled, config.sharding.shard_count, config.sharding.node_id
        );

        info!("Phase 2: Initializing write batcher");
        let batcher = Arc::new(WriteBatcher::new(
            config.batcher.clone(),
            sharding.clone(),
            ledger.clone(),
            store.clone(),
            event_bus.clone(),
        ));
        info!(
            "  [2] Write batcher ready (mode={:?}, primary={})",
            config.batcher.write_mode(),
            config.batcher.primary_chain
        );

        info!("Phase 3: Initializing bridge coordinator");
        let bridge = Arc::new(BridgeCoordinator::new(
            config.bridge.clone(),
            ledger.clone(),
            store.clone(),
            event_bus.clone(),
        ));
        info!(
            "  [3] Bridge ready (enabled={}, chains={:?})",
            config.bridge.enabled, config.bridge.chains
        );

        Ok(Self {
            sharding,
            batcher,
            bridge,
            event_bus,
            ledger,
            store,
            config,
        })
    }
}
