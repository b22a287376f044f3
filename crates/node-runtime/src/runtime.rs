//! # Node Runtime
//!
//! Owns the subsystem container and every background task.
//!
//! ## Startup Sequence
//!
//! 1. Recover bridge transfer maps from the record store
//! 2. Subscribe the relocation handler to the bridge topic
//! 3. Spawn the flush task (deferred mode only)
//! 4. Spawn the transfer snapshot task (non-zero interval only)
//!
//! ## Shutdown Sequence
//!
//! 1. Signal shutdown to all tasks
//! 2. Await them (the flush task drains the queue once more)
//! 3. Abort in-flight transfers and write the final transfer snapshot

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use shared_bus::{EventFilter, EventTopic};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::container::{NodeConfig, SubsystemContainer};
use crate::wiring::RelocationHandler;

/// Upper bound on waiting for background tasks at shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// The node runtime orchestrating all subsystems.
pub struct NodeRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<(&'static str, JoinHandle<()>)>>,
}

impl NodeRuntime {
    /// Build the container with production adapters.
    pub fn new(config: NodeConfig) -> Result<Self> {
        info!("Creating Shipment-Chain node runtime");
        let container = SubsystemContainer::new(config).context("failed to build subsystems")?;
        Ok(Self::with_container(container))
    }

    /// Wrap an already assembled container.
    pub fn with_container(container: SubsystemContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Recover persisted state and start background tasks.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  Shipment-Chain Node Runtime v{}", crate::VERSION);
        info!("===========================================");

        let c = &self.container;

        let recovered = c.bridge.recover().context("failed to recover bridge transfers")?;
        info!(
            "Recovered {} pending and {} confirmed transfers",
            recovered.pending, recovered.confirmed
        );

        let handler = RelocationHandler::new(
            c.event_bus.subscribe(EventFilter::topics(vec![EventTopic::Bridge])),
            Arc::clone(&c.batcher),
        );
        let relocation = tokio::spawn(handler.run(self.shutdown_rx.clone()));

        let mut tasks = self.tasks.lock();
        tasks.push(("relocation", relocation));
        if let Some(flush) = c.batcher.spawn_flush_task(self.shutdown_rx.clone()) {
            info!("Flush task started (every {}ms)", c.config.batcher.write_interval_ms);
            tasks.push(("flush", flush));
        }
        if let Some(persist) = c.bridge.spawn_persist_task(self.shutdown_rx.clone()) {
            info!(
                "Transfer snapshot task started (every {}ms)",
                c.config.bridge.persist_interval_ms
            );
            tasks.push(("bridge-persist", persist));
        }

        info!("Primary chain: {}", c.config.batcher.primary_chain);
        info!("Data Dir: {:?}", c.config.storage.data_dir);
        Ok(())
    }

    /// Shut down gracefully.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for (name, task) in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(task = name, error = %e, "Task ended abnormally"),
                Err(_) => warn!(task = name, "Task did not stop in time"),
            }
        }

        let aborted = self.container.bridge.shutdown();
        if aborted > 0 {
            warn!(aborted, "In-flight transfers interrupted");
        }
        info!("Shutdown complete");
    }

    /// Number of background tasks started.
    pub fn task_count(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}
