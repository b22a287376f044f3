//! Pending and confirmed transfer maps.
//!
//! A transfer lives in `pending` from acceptance until it completes, then
//! moves to `confirmed`. Failed transfers stay in `pending` for good.

use std::collections::BTreeMap;

use super::entities::TransferRecord;
use super::value_objects::TransferId;

/// Map of transfers keyed by id, as persisted.
pub type TransferMap = BTreeMap<TransferId, TransferRecord>;

/// The coordinator's transfer state.
#[derive(Clone, Debug, Default)]
pub struct TransferBook {
    pending: TransferMap,
    confirmed: TransferMap,
}

impl TransferBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Book restored from persisted maps.
    pub fn from_maps(pending: TransferMap, confirmed: TransferMap) -> Self {
        Self { pending, confirmed }
    }

    /// Look up pending first, then confirmed.
    pub fn get(&self, id: &str) -> Option<&TransferRecord> {
        self.pending.get(id).or_else(|| self.confirmed.get(id))
    }

    /// Whether either map holds `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` is in the pending map.
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// Mutable access to a pending record.
    pub fn pending_mut(&mut self, id: &str) -> Option<&mut TransferRecord> {
        self.pending.get_mut(id)
    }

    /// Insert or replace a pending record.
    pub fn insert_pending(&mut self, record: TransferRecord) {
        self.pending.insert(record.id.clone(), record);
    }

    /// Remove a pending record.
    pub fn remove_pending(&mut self, id: &str) -> Option<TransferRecord> {
        self.pending.remove(id)
    }

    /// Move a record from pending to confirmed. Returns false if it was not pending.
    pub fn confirm(&mut self, id: &str) -> bool {
        match self.pending.remove(id) {
            Some(record) => {
                self.confirmed.insert(record.id.clone(), record);
                true
            }
            None => false,
        }
    }

    /// Pending records.
    pub fn pending(&self) -> impl Iterator<Item = &TransferRecord> {
        self.pending.values()
    }

    /// Confirmed records.
    pub fn confirmed(&self) -> impl Iterator<Item = &TransferRecord> {
        self.confirmed.values()
    }

    /// Pending map as persisted.
    pub fn pending_map(&self) -> &TransferMap {
        &self.pending
    }

    /// Confirmed map as persisted.
    pub fn confirmed_map(&self) -> &TransferMap {
        &self.confirmed
    }

    /// Every transfer of a shipment, oldest first.
    pub fn for_shipment(&self, shipment_id: &str) -> Vec<TransferRecord> {
        let mut records: Vec<TransferRecord> = self
            .pending
            .values()
            .chain(self.confirmed.values())
            .filter(|record| record.shipment_id == shipment_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.initiated_at.cmp(&b.initiated_at).then_with(|| a.id.cmp(&b.id)));
        records
    }
}
