//! # Write Batcher Service
//!
//! Owns shipment and event records and issues their ledger writes, either
//! on the request path or through the deferred queue drained by
//! [`flush_task`].

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use parking_lot::Mutex;
use shared_bus::{EventPublisher, SyncEvent};
use shared_types::{
    generate_tracking_number, validate_identifier, ChainId, EventRecord, LedgerGateway,
    LedgerReceipt, Namespace, NewEvent, NewShipment, RecordStore, RecordStoreExt, ShipmentId,
    ShipmentRecord,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::algorithms::route_write;
use crate::domain::{
    BatcherConfig, BatcherError, FlushReport, LedgerOutcome, NoOpReason, PendingQueue,
    PendingWrite, ResubmittedWrite, WriteMode, WriteReceipt, WriteRoute, WriteTag,
};
use crate::metrics::{BatcherMetrics, BatcherMetricsSnapshot};
use crate::ports::{ShardingApi, ShipmentSyncApi};

/// Attempts at drawing an unused tracking number.
const MAX_ID_ATTEMPTS: usize = 8;

/// Shipment/event lifecycle owner and ledger write scheduler.
pub struct WriteBatcher {
    config: BatcherConfig,
    sharding: Arc<dyn ShardingApi>,
    ledger: Arc<dyn LedgerGateway>,
    store: Arc<dyn RecordStore>,
    publisher: Arc<dyn EventPublisher>,
    queue: PendingQueue,
    /// Single-flight guard: one flush cycle at a time.
    flush_guard: tokio::sync::Mutex<()>,
    /// Serializes read-modify-write of stored records. Never held across `.await`.
    record_lock: Mutex<()>,
    metrics: BatcherMetrics,
}

impl WriteBatcher {
    /// Create a write batcher over its collaborators.
    pub fn new(
        config: BatcherConfig,
        sharding: Arc<dyn ShardingApi>,
        ledger: Arc<dyn LedgerGateway>,
        store: Arc<dyn RecordStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            config,
            sharding,
            ledger,
            store,
            publisher,
            queue: PendingQueue::new(),
            flush_guard: tokio::sync::Mutex::new(()),
            record_lock: Mutex::new(()),
            metrics: BatcherMetrics::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }

    /// Number of writes waiting for the next flush.
    pub fn pending_writes(&self) -> usize {
        self.queue.len()
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> BatcherMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Point a shipment at the chain its canonical record was relocated to.
    ///
    /// When the relocation registered the shipment on the target chain,
    /// `registration_tx` marks the local record as recorded. Subsequent
    /// writes route straight to `chain`.
    pub fn apply_relocation(
        &self,
        shipment_id: &str,
        chain: ChainId,
        registration_tx: Option<String>,
    ) -> Result<ShipmentRecord, BatcherError> {
        validate_identifier(shipment_id)?;
        let _guard = self.record_lock.lock();

        let mut shipment = self.load_shipment(shipment_id)?;
        shipment.target_chain = Some(chain.clone());
        if registration_tx.is_some() {
            shipment.mark_recorded(registration_tx);
        }
        self.store
            .put_json(Namespace::Shipments, &shipment.id, &shipment)?;

        info!(
            shipment_id = %shipment.id,
            chain = %chain,
            recorded = shipment.blockchain_recorded,
            "[sc-02] Shipment relocated"
        );
        Ok(shipment)
    }

    /// Re-apply the routing rule to every unrecorded write of a shipment.
    ///
    /// Nothing is retried automatically; this is the external recovery hook.
    /// Writes already queued or being sent by a running flush are not
    /// duplicated.
    pub async fn resubmit(&self, shipment_id: &str) -> Result<Vec<ResubmittedWrite>, BatcherError> {
        validate_identifier(shipment_id)?;
        let shipment = self.load_shipment(shipment_id)?;
        if !self.config.blockchain_enabled {
            return Ok(Vec::new());
        }

        let mut resubmitted = Vec::new();

        // Queue check comes before the record read: a flush persists the
        // record before it releases the write.
        if !self.queue.contains(&shipment.id, None) {
            let shipment = self.load_shipment(&shipment.id)?;
            if !shipment.blockchain_recorded {
                let ledger = self.dispatch(self.route(&shipment), &shipment, None).await?;
                resubmitted.push(ResubmittedWrite {
                    event_id: None,
                    ledger,
                });
            }
        }

        for event_id in &shipment.event_ids {
            if self.queue.contains(&shipment.id, Some(event_id)) {
                continue;
            }
            let Some(event) = self.store.get_json::<EventRecord>(Namespace::Events, event_id)? else {
                warn!(shipment_id = %shipment.id, event_id = %event_id, "[sc-02] Event missing from store");
                continue;
            };
            if event.blockchain_recorded {
                continue;
            }
            let ledger = self
                .dispatch(self.route(&shipment), &shipment, Some(&event))
                .await?;
            resubmitted.push(ResubmittedWrite {
                event_id: Some(event.id.clone()),
                ledger,
            });
        }

        info!(
            shipment_id = %shipment.id,
            writes = resubmitted.len(),
            "[sc-02] Shipment resubmitted"
        );
        Ok(resubmitted)
    }

    /// Start the periodic flush when deferred mode is active.
    ///
    /// Returns `None` in synchronous mode or with ledger integration off.
    pub fn spawn_flush_task(self: &Arc<Self>, shutdown: watch::Receiver<bool>) -> Option<JoinHandle<()>> {
        if !self.config.blockchain_enabled || self.config.write_mode() == WriteMode::Synchronous {
            return None;
        }
        let period = Duration::from_millis(self.config.write_interval_ms);
        Some(tokio::spawn(flush_task(Arc::clone(self), period, shutdown)))
    }

    fn route(&self, shipment: &ShipmentRecord) -> WriteRoute {
        route_write(
            self.sharding.as_ref(),
            &self.config,
            shipment.shard_id,
            shipment.target_chain.as_ref(),
        )
    }

    fn load_shipment(&self, shipment_id: &str) -> Result<ShipmentRecord, BatcherError> {
        self.store
            .get_json::<ShipmentRecord>(Namespace::Shipments, shipment_id)?
            .ok_or_else(|| BatcherError::ShipmentNotFound(shipment_id.to_string()))
    }

    fn shipment_exists(&self, shipment_id: &str) -> Result<bool, BatcherError> {
        Ok(self.store.get(Namespace::Shipments, shipment_id)?.is_some())
    }

    fn allocate_id(&self, requested: Option<ShipmentId>) -> Result<ShipmentId, BatcherError> {
        if let Some(id) = requested {
            validate_identifier(&id)?;
            if self.shipment_exists(&id)? {
                return Err(BatcherError::ShipmentExists(id));
            }
            return Ok(id);
        }

        let mut last = String::new();
        for _ in 0..MAX_ID_ATTEMPTS {
            let now_millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
            last = generate_tracking_number(&self.config.tracking_prefix, now_millis);
            if !self.shipment_exists(&last)? {
                return Ok(last);
            }
        }
        Err(BatcherError::ShipmentExists(last))
    }

    fn insert_shipment(&self, input: NewShipment) -> Result<ShipmentRecord, BatcherError> {
        let _guard = self.record_lock.lock();

        let id = self.allocate_id(input.id)?;
        let shard = self.sharding.shard_of(&id)?;
        let shipment = ShipmentRecord::new(id, input.details, shard, Utc::now());
        self.store
            .put_json(Namespace::Shipments, &shipment.id, &shipment)?;
        Ok(shipment)
    }

    fn append_event(
        &self,
        shipment_id: &str,
        input: NewEvent,
    ) -> Result<(ShipmentRecord, EventRecord), BatcherError> {
        let _guard = self.record_lock.lock();

        let mut shipment = self.load_shipment(shipment_id)?;
        let event = EventRecord {
            id: Uuid::new_v4().to_string(),
            shipment_id: shipment.id.clone(),
            event_type: input.event_type,
            location: input.location,
            payload: input.payload,
            timestamp: input.timestamp.unwrap_or_else(Utc::now),
            blockchain_recorded: false,
            blockchain_tx_hash: None,
        };
        shipment.event_ids.push(event.id.clone());

        self.store.put_json(Namespace::Events, &event.id, &event)?;
        self.store
            .put_json(Namespace::Shipments, &shipment.id, &shipment)?;
        Ok((shipment, event))
    }

    fn mark_recorded(&self, write: &PendingWrite, tx_hash: Option<String>) -> Result<(), BatcherError> {
        let _guard = self.record_lock.lock();

        match write.tag {
            WriteTag::RegisterShipment => {
                let mut shipment = self.load_shipment(&write.shipment_id)?;
                shipment.mark_recorded(tx_hash);
                self.store
                    .put_json(Namespace::Shipments, &shipment.id, &shipment)?;
            }
            WriteTag::RecordEvent => {
                let event_id = write.event_id.as_deref().unwrap_or_default();
                let mut event = self
                    .store
                    .get_json::<EventRecord>(Namespace::Events, event_id)?
                    .ok_or_else(|| {
                        BatcherError::PersistenceFailure(format!("event {event_id} missing from store"))
                    })?;
                event.mark_recorded(tx_hash);
                self.store.put_json(Namespace::Events, &event.id, &event)?;
            }
        }
        Ok(())
    }

    async fn submit(&self, write: &PendingWrite) -> LedgerReceipt {
        match write.tag {
            WriteTag::RegisterShipment => {
                self.ledger
                    .register_shipment(&write.shipment_id, &write.metadata_digest, &write.chain)
                    .await
            }
            WriteTag::RecordEvent => {
                let event_type = write.event_type.as_deref().unwrap_or_default();
                self.ledger
                    .record_event(
                        &write.shipment_id,
                        event_type,
                        &write.metadata_digest,
                        &write.chain,
                    )
                    .await
            }
        }
    }

    /// Apply a gateway result to the stored record and announce it.
    async fn settle(&self, write: &PendingWrite, receipt: &LedgerReceipt) -> Result<(), BatcherError> {
        let applied = if receipt.success {
            self.mark_recorded(write, receipt.tx_hash.clone())
        } else {
            warn!(
                shipment_id = %write.shipment_id,
                event_id = ?write.event_id,
                chain = %write.chain,
                error = receipt.error.as_deref().unwrap_or("unknown"),
                "[sc-02] Ledger write failed, record stays unrecorded"
            );
            Ok(())
        };

        self.publisher
            .publish(SyncEvent::LedgerWriteSettled {
                shipment_id: write.shipment_id.clone(),
                event_id: write.event_id.clone(),
                chain: write.chain.clone(),
                receipt: receipt.clone(),
            })
            .await;

        applied
    }

    async fn dispatch(
        &self,
        route: WriteRoute,
        shipment: &ShipmentRecord,
        event: Option<&EventRecord>,
    ) -> Result<LedgerOutcome, BatcherError> {
        let build = |chain: ChainId| match event {
            Some(event) => PendingWrite::event(event, chain),
            None => PendingWrite::register(shipment, chain),
        };
        let event_id = event.map(|e| e.id.clone());

        match route {
            WriteRoute::Direct(chain) => {
                let write = build(chain);
                BatcherMetrics::incr(&self.metrics.sync_writes);

                let receipt = self.submit(&write).await;
                self.settle(&write, &receipt).await?;

                if receipt.success {
                    Ok(LedgerOutcome::Recorded {
                        tx_hash: receipt.tx_hash,
                    })
                } else {
                    BatcherMetrics::incr(&self.metrics.sync_failures);
                    Ok(LedgerOutcome::Failed {
                        error: receipt
                            .error
                            .unwrap_or_else(|| "unknown ledger error".to_string()),
                    })
                }
            }
            WriteRoute::Deferred(chain) => {
                self.queue.enqueue(build(chain.clone()));
                BatcherMetrics::incr(&self.metrics.enqueued_writes);
                debug!(
                    shipment_id = %shipment.id,
                    event_id = ?event_id,
                    chain = %chain,
                    "[sc-02] Ledger write deferred to next flush"
                );
                Ok(LedgerOutcome::Pending { chain })
            }
            WriteRoute::NoOp(NoOpReason::AwaitingBridge) => {
                BatcherMetrics::incr(&self.metrics.awaiting_bridge);
                info!(
                    shipment_id = %shipment.id,
                    event_id = ?event_id,
                    shard = shipment.shard_id,
                    "[sc-02] Shard owned elsewhere, write awaits bridge relocation"
                );
                Ok(LedgerOutcome::AwaitingBridge)
            }
            WriteRoute::NoOp(NoOpReason::Dropped) => {
                BatcherMetrics::incr(&self.metrics.dropped_writes);
                error!(
                    shipment_id = %shipment.id,
                    event_id = ?event_id,
                    shard = shipment.shard_id,
                    "[sc-02] WRITE DROPPED: shard owned elsewhere and bridging disabled"
                );
                self.publisher
                    .publish(SyncEvent::WriteDropped {
                        shipment_id: shipment.id.clone(),
                        event_id,
                    })
                    .await;
                Ok(LedgerOutcome::Dropped)
            }
        }
    }

    /// Issue one shipment's writes in FIFO order. Returns (succeeded, failed).
    async fn flush_shipment(&self, shipment_id: ShipmentId, writes: Vec<PendingWrite>) -> (usize, usize) {
        let mut succeeded = 0;
        let mut failed = 0;

        for write in writes {
            let receipt = self.submit(&write).await;
            let settled = self.settle(&write, &receipt).await;
            self.queue.release(&write);
            match settled {
                Ok(()) if receipt.success => succeeded += 1,
                Ok(()) => failed += 1,
                Err(err) => {
                    warn!(
                        shipment_id = %shipment_id,
                        event_id = ?write.event_id,
                        error = %err,
                        "[sc-02] Ledger write landed but record update failed"
                    );
                    failed += 1;
                }
            }
        }

        (succeeded, failed)
    }
}

#[async_trait]
impl ShipmentSyncApi for WriteBatcher {
    async fn create_shipment(
        &self,
        input: NewShipment,
        record_on_chain: bool,
    ) -> Result<WriteReceipt<ShipmentRecord>, BatcherError> {
        let shipment = self.insert_shipment(input)?;
        debug!(
            shipment_id = %shipment.id,
            shard = shipment.shard_id,
            "[sc-02] Shipment persisted"
        );

        if !record_on_chain || !self.config.blockchain_enabled {
            return Ok(WriteReceipt {
                record: shipment,
                ledger: LedgerOutcome::Skipped,
            });
        }

        let ledger = self.dispatch(self.route(&shipment), &shipment, None).await?;
        let record = if ledger.is_recorded() {
            self.load_shipment(&shipment.id)?
        } else {
            shipment
        };
        Ok(WriteReceipt { record, ledger })
    }

    async fn record_event(
        &self,
        shipment_id: &str,
        input: NewEvent,
        record_on_chain: bool,
    ) -> Result<WriteReceipt<EventRecord>, BatcherError> {
        validate_identifier(shipment_id)?;
        validate_identifier(&input.event_type)?;

        let (shipment, event) = self.append_event(shipment_id, input)?;
        debug!(
            shipment_id = %shipment.id,
            event_id = %event.id,
            event_type = %event.event_type,
            "[sc-02] Event persisted"
        );

        if !record_on_chain || !self.config.blockchain_enabled {
            return Ok(WriteReceipt {
                record: event,
                ledger: LedgerOutcome::Skipped,
            });
        }

        let ledger = self
            .dispatch(self.route(&shipment), &shipment, Some(&event))
            .await?;
        let record = if ledger.is_recorded() {
            self.get_event(&event.id)?.unwrap_or(event)
        } else {
            event
        };
        Ok(WriteReceipt { record, ledger })
    }

    async fn flush(&self) -> FlushReport {
        let _cycle = self.flush_guard.lock().await;

        let batch = self.queue.take_all();
        BatcherMetrics::incr(&self.metrics.flush_cycles);
        if batch.is_empty() {
            return FlushReport::default();
        }

        let shipments = batch.len();
        let attempted: usize = batch.values().map(Vec::len).sum();
        debug!(shipments, attempted, "[sc-02] Flush cycle started");

        // Shipments run concurrently; join_all waits for every one to settle.
        let results = join_all(
            batch
                .into_iter()
                .map(|(shipment_id, writes)| self.flush_shipment(shipment_id, writes)),
        )
        .await;

        let succeeded: usize = results.iter().map(|(ok, _)| ok).sum();
        let failed: usize = results.iter().map(|(_, err)| err).sum();
        BatcherMetrics::add(&self.metrics.flush_successes, succeeded);
        BatcherMetrics::add(&self.metrics.flush_failures, failed);

        let report = FlushReport {
            attempted,
            succeeded,
            failed,
            shipments,
        };
        if failed > 0 {
            warn!(attempted, succeeded, failed, "[sc-02] Flush cycle finished with failures");
        } else {
            info!(attempted, shipments, "[sc-02] Flush cycle finished");
        }

        self.publisher
            .publish(SyncEvent::FlushCompleted {
                attempted,
                succeeded,
                failed,
            })
            .await;

        report
    }

    fn get_shipment(&self, shipment_id: &str) -> Result<Option<ShipmentRecord>, BatcherError> {
        Ok(self.store.get_json(Namespace::Shipments, shipment_id)?)
    }

    fn get_event(&self, event_id: &str) -> Result<Option<EventRecord>, BatcherError> {
        Ok(self.store.get_json(Namespace::Events, event_id)?)
    }

    fn shipment_events(&self, shipment_id: &str) -> Result<Vec<EventRecord>, BatcherError> {
        let shipment = self.load_shipment(shipment_id)?;
        shipment
            .event_ids
            .iter()
            .map(|event_id| {
                self.get_event(event_id)?.ok_or_else(|| {
                    BatcherError::PersistenceFailure(format!("event {event_id} missing from store"))
                })
            })
            .collect()
    }
}

/// Background flush loop.
///
/// First tick fires one full `period` after start. On shutdown the queue is
/// drained once more before the task exits.
pub async fn flush_task(batcher: Arc<WriteBatcher>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(interval_ms = period.as_millis() as u64, "[sc-02] Flush task started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                batcher.flush().await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    let report = batcher.flush().await;
                    info!(drained = report.attempted, "[sc-02] Flush task stopped");
                    break;
                }
            }
        }
    }
}
