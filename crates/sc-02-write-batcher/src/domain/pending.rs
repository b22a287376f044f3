//! Pending write queue.
//!
//! Per-shipment FIFO lists of deferred ledger calls. A flush takes the
//! whole map in one swap; writes enqueued afterwards land in the fresh map
//! and wait for the next cycle. Taken writes stay tracked as in flight
//! until the flush settles them.

use parking_lot::Mutex;
use shared_types::ShipmentId;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::entities::PendingWrite;

/// Swapped-out queue contents handed to a flush cycle.
pub type PendingBatch = HashMap<ShipmentId, Vec<PendingWrite>>;

type WriteKey = (ShipmentId, Option<String>);

#[derive(Default)]
struct QueueState {
    queued: PendingBatch,
    in_flight: HashSet<WriteKey>,
}

/// In-memory deferred write queue.
#[derive(Default)]
pub struct PendingQueue {
    state: Mutex<QueueState>,
}

impl PendingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a write behind earlier writes for the same shipment.
    pub fn enqueue(&self, write: PendingWrite) {
        let mut state = self.state.lock();
        let list = state.queued.entry(write.shipment_id.clone()).or_default();
        list.push(write);
        debug!(queued_for_shipment = list.len(), "[sc-02] Write enqueued");
    }

    /// Atomically replace the queue with an empty one and return its contents.
    ///
    /// Every returned write counts as in flight until [`release`](Self::release).
    pub fn take_all(&self) -> PendingBatch {
        let mut state = self.state.lock();
        let batch = std::mem::take(&mut state.queued);
        state.in_flight.extend(
            batch
                .values()
                .flatten()
                .map(|w| (w.shipment_id.clone(), w.event_id.clone())),
        );
        batch
    }

    /// Mark a taken write as settled.
    ///
    /// Call only after the record update for the write has been persisted.
    pub fn release(&self, write: &PendingWrite) {
        self.state
            .lock()
            .in_flight
            .remove(&(write.shipment_id.clone(), write.event_id.clone()));
    }

    /// Whether a write for this record is queued or still being flushed.
    pub fn contains(&self, shipment_id: &str, event_id: Option<&str>) -> bool {
        let state = self.state.lock();
        let queued = state
            .queued
            .get(shipment_id)
            .is_some_and(|list| list.iter().any(|w| w.targets(shipment_id, event_id)));
        queued
            || state
                .in_flight
                .contains(&(shipment_id.to_string(), event_id.map(str::to_string)))
    }

    /// Total number of queued writes, excluding those in flight.
    pub fn len(&self) -> usize {
        self.state.lock().queued.values().map(Vec::len).sum()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of taken writes not yet released.
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight.len()
    }
}
