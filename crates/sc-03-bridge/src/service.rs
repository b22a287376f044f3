//! # Bridge Coordinator Service
//!
//! Accepts relocation requests, runs each one as a retained background
//! task and keeps the pending/confirmed maps durable.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use shared_bus::{EventPublisher, SyncEvent};
use shared_types::{
    validate_identifier, ChainId, LedgerGateway, Namespace, RecordStore, RecordStoreExt, StoreError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::algorithms::derive_transfer_id;
use crate::domain::{
    BridgeConfig, BridgeError, RecoveredTransfers, TransferBook, TransferId, TransferInitiation,
    TransferMap, TransferRecord, TransferStatus,
};
use crate::metrics::{BridgeMetrics, BridgeMetricsSnapshot};
use crate::ports::BridgeApi;

/// Key under which each transfer map is stored in its namespace.
pub const TRANSFER_MAP_KEY: &str = "transfers";

const MAX_ID_ATTEMPTS: usize = 16;

/// State shared with the background transfer tasks.
struct BridgeCore {
    config: BridgeConfig,
    ledger: Arc<dyn LedgerGateway>,
    store: Arc<dyn RecordStore>,
    publisher: Arc<dyn EventPublisher>,
    book: RwLock<TransferBook>,
    /// Orders snapshot writes. Taken before `book`, never the other way round.
    persist_lock: Mutex<()>,
    sequence: AtomicU64,
    metrics: BridgeMetrics,
}

impl BridgeCore {
    /// Copy both maps under a short read lock, then write the copies.
    ///
    /// The book is not locked during store I/O. Snapshots are written in
    /// the order they were taken.
    fn write_snapshot(&self) -> Result<(), StoreError> {
        let _order = self.persist_lock.lock();
        let (pending, confirmed) = {
            let book = self.book.read();
            (book.pending_map().clone(), book.confirmed_map().clone())
        };
        self.store
            .put_json(Namespace::BridgePendingTransfers, TRANSFER_MAP_KEY, &pending)?;
        self.store
            .put_json(Namespace::BridgeConfirmedTransfers, TRANSFER_MAP_KEY, &confirmed)
    }

    fn persist(&self) -> Result<(), BridgeError> {
        self.write_snapshot().map_err(|err| {
            BridgeMetrics::incr(&self.metrics.persist_failures);
            BridgeError::from(err)
        })
    }

    fn allocate_id(
        &self,
        book: &TransferBook,
        shipment_id: &str,
        source: &ChainId,
        target: &ChainId,
        unix_millis: i64,
    ) -> Result<TransferId, BridgeError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
            let id = derive_transfer_id(shipment_id, source, target, unix_millis, sequence);
            if !book.contains(&id) {
                return Ok(id);
            }
            debug!(transfer_id = %id, "[sc-03] Transfer id collision, redrawing");
        }
        Err(BridgeError::PersistenceFailure(
            "could not allocate a unique transfer id".to_string(),
        ))
    }

    /// Record a new pending transfer. Nothing is kept if the store refuses it.
    fn insert_transfer(
        &self,
        shipment_id: &str,
        source: &ChainId,
        target: &ChainId,
        snapshot: Value,
    ) -> Result<TransferRecord, BridgeError> {
        let now = Utc::now();
        let record = {
            let mut book = self.book.write();
            let id = self.allocate_id(&book, shipment_id, source, target, now.timestamp_millis())?;
            let record = TransferRecord::new(
                id,
                shipment_id.to_string(),
                source.clone(),
                target.clone(),
                snapshot,
                now,
            );
            book.insert_pending(record.clone());
            record
        };

        if let Err(err) = self.write_snapshot() {
            self.book.write().remove_pending(&record.id);
            BridgeMetrics::incr(&self.metrics.persist_failures);
            return Err(err.into());
        }
        Ok(record)
    }

    /// Apply a status change and persist both maps.
    ///
    /// A completed transfer moves to the confirmed map. A store failure
    /// here is logged; the in-memory state stays authoritative and the next
    /// snapshot writes it.
    fn advance(
        &self,
        transfer_id: &str,
        next: TransferStatus,
        apply: impl FnOnce(&mut TransferRecord),
    ) -> Result<TransferRecord, BridgeError> {
        let updated = {
            let mut book = self.book.write();
            let record = book
                .pending_mut(transfer_id)
                .ok_or_else(|| BridgeError::TransferNotFound(transfer_id.to_string()))?;
            record.transition_to(next, Utc::now())?;
            apply(record);
            let updated = record.clone();

            if next == TransferStatus::Completed {
                book.confirm(transfer_id);
            }
            updated
        };

        if let Err(err) = self.write_snapshot() {
            BridgeMetrics::incr(&self.metrics.persist_failures);
            warn!(
                transfer_id = %transfer_id,
                status = %next,
                error = %err,
                "[sc-03] Transfer state not persisted"
            );
        }
        Ok(updated)
    }

    async fn process_transfer(self: Arc<Self>, transfer_id: TransferId) {
        let transfer = match self.advance(&transfer_id, TransferStatus::Processing, |_| {}) {
            Ok(transfer) => transfer,
            Err(err) => {
                warn!(transfer_id = %transfer_id, error = %err, "[sc-03] Transfer cannot start");
                return;
            }
        };

        debug!(
            transfer_id = %transfer_id,
            shipment_id = %transfer.shipment_id,
            target = %transfer.target_chain,
            "[sc-03] Registering shipment on target chain"
        );
        let receipt = self
            .ledger
            .register_shipment(
                &transfer.shipment_id,
                &transfer.target_digest(),
                &transfer.target_chain,
            )
            .await;

        let settled = if receipt.success {
            let tx_hash = receipt.tx_hash;
            self.advance(&transfer_id, TransferStatus::Completed, |record| {
                record.target_tx_hash = tx_hash;
            })
        } else {
            let reason = receipt
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "target registration failed".to_string());
            self.advance(&transfer_id, TransferStatus::Failed, |record| {
                record.error = Some(reason);
            })
        };

        let record = match settled {
            Ok(record) => record,
            Err(err) => {
                error!(transfer_id = %transfer_id, error = %err, "[sc-03] Transfer outcome lost");
                return;
            }
        };

        if record.status == TransferStatus::Completed {
            BridgeMetrics::incr(&self.metrics.completed);
            info!(
                transfer_id = %record.id,
                shipment_id = %record.shipment_id,
                target = %record.target_chain,
                tx_hash = ?record.target_tx_hash,
                "[sc-03] Transfer completed"
            );
            self.publisher
                .publish(SyncEvent::TransferCompleted {
                    transfer_id: record.id,
                    shipment_id: record.shipment_id,
                    target_chain: record.target_chain,
                    target_tx_hash: record.target_tx_hash,
                })
                .await;
        } else {
            BridgeMetrics::incr(&self.metrics.failed);
            let reason = record.error.unwrap_or_default();
            warn!(
                transfer_id = %record.id,
                shipment_id = %record.shipment_id,
                target = %record.target_chain,
                error = %reason,
                "[sc-03] Transfer failed, left in pending"
            );
            self.publisher
                .publish(SyncEvent::TransferFailed {
                    transfer_id: record.id,
                    shipment_id: record.shipment_id,
                    error: reason,
                })
                .await;
        }
    }
}

/// Background task for one transfer.
struct TransferTask {
    handle: JoinHandle<()>,
    /// Flips to `true` when processing returns. Closed without a `true`
    /// when the task is aborted or panics.
    done: watch::Receiver<bool>,
}

/// Cross-chain relocation coordinator.
pub struct BridgeCoordinator {
    core: Arc<BridgeCore>,
    tasks: Mutex<HashMap<TransferId, TransferTask>>,
}

impl BridgeCoordinator {
    /// Create a coordinator with empty transfer maps.
    ///
    /// Call [`BridgeCoordinator::recover`] to load persisted state.
    pub fn new(
        config: BridgeConfig,
        ledger: Arc<dyn LedgerGateway>,
        store: Arc<dyn RecordStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            core: Arc::new(BridgeCore {
                config,
                ledger,
                store,
                publisher,
                book: RwLock::new(TransferBook::new()),
                persist_lock: Mutex::new(()),
                sequence: AtomicU64::new(0),
                metrics: BridgeMetrics::new(),
            }),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.core.config
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> BridgeMetricsSnapshot {
        self.core.metrics.snapshot()
    }

    /// Strict variant of [`BridgeApi::initiate_transfer`].
    pub async fn try_initiate_transfer(
        &self,
        shipment_id: &str,
        source: &ChainId,
        target: &ChainId,
    ) -> Result<TransferId, BridgeError> {
        let transfer = match self.accept(shipment_id, source, target).await {
            Ok(transfer) => transfer,
            Err(err) => {
                BridgeMetrics::incr(&self.core.metrics.rejected);
                info!(
                    shipment_id = %shipment_id,
                    source = %source,
                    target = %target,
                    error = %err,
                    "[sc-03] Transfer rejected"
                );
                return Err(err);
            }
        };

        BridgeMetrics::incr(&self.core.metrics.initiated);
        info!(
            transfer_id = %transfer.id,
            shipment_id = %transfer.shipment_id,
            source = %transfer.source_chain,
            target = %transfer.target_chain,
            "[sc-03] Transfer accepted"
        );
        self.core
            .publisher
            .publish(SyncEvent::TransferInitiated {
                transfer_id: transfer.id.clone(),
                shipment_id: transfer.shipment_id.clone(),
                source_chain: transfer.source_chain.clone(),
                target_chain: transfer.target_chain.clone(),
            })
            .await;

        self.spawn_processing(transfer.id.clone());
        Ok(transfer.id)
    }

    async fn accept(
        &self,
        shipment_id: &str,
        source: &ChainId,
        target: &ChainId,
    ) -> Result<TransferRecord, BridgeError> {
        let config = &self.core.config;
        if !config.enabled {
            return Err(BridgeError::BridgeDisabled);
        }
        validate_identifier(shipment_id)?;
        for chain in [source, target] {
            if !config.is_supported(chain) {
                return Err(BridgeError::UnsupportedChain(chain.to_string()));
            }
        }
        if source == target {
            return Err(BridgeError::SameChain(source.to_string()));
        }

        let verification = self.core.ledger.verify_shipment(shipment_id, source).await;
        if !verification.exists {
            if let Some(reason) = &verification.error {
                warn!(
                    shipment_id = %shipment_id,
                    chain = %source,
                    error = %reason,
                    "[sc-03] Source verification failed"
                );
            }
            return Err(BridgeError::ShipmentNotFoundOnSource {
                shipment_id: shipment_id.to_string(),
                chain: source.to_string(),
            });
        }

        let snapshot = verification
            .metadata
            .unwrap_or_else(|| json!({ "shipment_id": shipment_id }));
        self.core.insert_transfer(shipment_id, source, target, snapshot)
    }

    fn spawn_processing(&self, transfer_id: TransferId) {
        let (done_tx, done) = watch::channel(false);
        let core = Arc::clone(&self.core);
        let id = transfer_id.clone();
        let handle = tokio::spawn(async move {
            core.process_transfer(id).await;
            done_tx.send_replace(true);
        });

        let mut tasks = self.tasks.lock();
        tasks.retain(|_, task| !task.handle.is_finished());
        tasks.insert(transfer_id, TransferTask { handle, done });
    }

    /// Wait for a transfer's background task, then return its record.
    ///
    /// The task stays owned by the coordinator while waiting, so a
    /// cancelled wait leaves it abortable by [`BridgeCoordinator::shutdown`].
    pub async fn wait_for_transfer(&self, transfer_id: &str) -> Option<TransferRecord> {
        let done = self
            .tasks
            .lock()
            .get(transfer_id)
            .map(|task| task.done.clone());
        if let Some(mut done) = done {
            if done.wait_for(|finished| *finished).await.is_err() {
                warn!(transfer_id = %transfer_id, "[sc-03] Transfer task ended abnormally");
            }
        }
        self.get_transfer_status(transfer_id)
    }

    /// Transfer tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tasks
            .lock()
            .values()
            .filter(|task| !task.handle.is_finished())
            .count()
    }

    /// Abort in-flight transfer tasks and write a final snapshot.
    ///
    /// Aborted transfers keep the status they last reached. Returns the
    /// number of tasks aborted.
    pub fn shutdown(&self) -> usize {
        let tasks: Vec<(TransferId, TransferTask)> = self.tasks.lock().drain().collect();

        let mut aborted = 0;
        for (transfer_id, task) in tasks {
            if !task.handle.is_finished() {
                task.handle.abort();
                aborted += 1;
                debug!(transfer_id = %transfer_id, "[sc-03] Transfer task aborted");
            }
        }

        if let Err(err) = self.core.persist() {
            warn!(error = %err, "[sc-03] Final transfer snapshot failed");
        }
        info!(aborted, "[sc-03] Bridge stopped");
        aborted
    }

    /// Write both maps to the store now.
    pub fn persist(&self) -> Result<(), BridgeError> {
        self.core.persist()
    }

    /// Replace in-memory state with the persisted maps.
    ///
    /// Records keep their stored status; nothing is resumed.
    pub fn recover(&self) -> Result<RecoveredTransfers, BridgeError> {
        let store = &self.core.store;
        let pending: TransferMap = store
            .get_json(Namespace::BridgePendingTransfers, TRANSFER_MAP_KEY)?
            .unwrap_or_default();
        let confirmed: TransferMap = store
            .get_json(Namespace::BridgeConfirmedTransfers, TRANSFER_MAP_KEY)?
            .unwrap_or_default();

        let recovered = RecoveredTransfers {
            pending: pending.len(),
            confirmed: confirmed.len(),
        };
        let stalled = pending.values().filter(|r| !r.status.is_terminal()).count();

        *self.core.book.write() = TransferBook::from_maps(pending, confirmed);
        info!(
            pending = recovered.pending,
            confirmed = recovered.confirmed,
            stalled,
            "[sc-03] Transfer state recovered"
        );
        Ok(recovered)
    }

    /// Start the periodic snapshot of both maps.
    ///
    /// Returns `None` when the interval is `0`.
    pub fn spawn_persist_task(&self, shutdown: watch::Receiver<bool>) -> Option<JoinHandle<()>> {
        if self.core.config.persist_interval_ms == 0 {
            return None;
        }
        let period = Duration::from_millis(self.core.config.persist_interval_ms);
        Some(tokio::spawn(persist_task(Arc::clone(&self.core), period, shutdown)))
    }
}

async fn persist_task(core: Arc<BridgeCore>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = core.persist() {
                    warn!(error = %err, "[sc-03] Periodic transfer snapshot failed");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    if let Err(err) = core.persist() {
                        warn!(error = %err, "[sc-03] Final transfer snapshot failed");
                    }
                    debug!("[sc-03] Persist task stopped");
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl BridgeApi for BridgeCoordinator {
    async fn initiate_transfer(
        &self,
        shipment_id: &str,
        source: &ChainId,
        target: &ChainId,
    ) -> TransferInitiation {
        self.try_initiate_transfer(shipment_id, source, target)
            .await
            .into()
    }

    fn get_transfer_status(&self, transfer_id: &str) -> Option<TransferRecord> {
        self.core.book.read().get(transfer_id).cloned()
    }

    fn transfers_for_shipment(&self, shipment_id: &str) -> Vec<TransferRecord> {
        self.core.book.read().for_shipment(shipment_id)
    }

    fn is_chain_supported(&self, chain: &ChainId) -> bool {
        self.core.config.is_supported(chain)
    }
}
