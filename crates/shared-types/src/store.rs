//! # Record Store Port
//!
//! Durable key/value persistence partitioned by namespace. Values are
//! opaque bytes; [`RecordStoreExt`] layers JSON on top.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::StoreError;

/// Logical partition of the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Shipment records keyed by shipment id.
    Shipments,
    /// Event records keyed by event id.
    Events,
    /// Bridge pending-transfer map (single key).
    BridgePendingTransfers,
    /// Bridge confirmed-transfer map (single key).
    BridgeConfirmedTransfers,
}

impl Namespace {
    /// Every namespace.
    pub const ALL: [Namespace; 4] = [
        Namespace::Shipments,
        Namespace::Events,
        Namespace::BridgePendingTransfers,
        Namespace::BridgeConfirmedTransfers,
    ];

    /// Stable on-disk name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Shipments => "shipments",
            Namespace::Events => "events",
            Namespace::BridgePendingTransfers => "bridge_pending_transfers",
            Namespace::BridgeConfirmedTransfers => "bridge_confirmed_transfers",
        }
    }

    /// Parse an on-disk name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.as_str() == name)
    }
}

/// Record store port.
///
/// Writes are visible to subsequent reads from any thread.
pub trait RecordStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, namespace: Namespace, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Fetch the value under `key`.
    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Remove `key`. Missing keys are not an error.
    fn delete(&self, namespace: Namespace, key: &str) -> Result<(), StoreError>;

    /// Keys present in `namespace`.
    fn keys(&self, namespace: Namespace) -> Result<Vec<String>, StoreError>;
}

/// JSON helpers over any [`RecordStore`].
pub trait RecordStoreExt: RecordStore {
    /// Serialize and store.
    fn put_json<T: Serialize>(&self, namespace: Namespace, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        self.put(namespace, key, &bytes)
    }

    /// Fetch and deserialize.
    fn get_json<T: DeserializeOwned>(&self, namespace: Namespace, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(namespace, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Volatile store with write-failure injection.
#[derive(Default)]
pub struct InMemoryRecordStore {
    data: RwLock<HashMap<(Namespace, String), Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl InMemoryRecordStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put`/`delete` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Total number of stored values.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn put(&self, namespace: Namespace, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.check_writable()?;
        self.data
            .write()
            .insert((namespace, key.to_string()), value.to_vec());
        Ok(())
    }

    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.read().get(&(namespace, key.to_string())).cloned())
    }

    fn delete(&self, namespace: Namespace, key: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.data.write().remove(&(namespace, key.to_string()));
        Ok(())
    }

    fn keys(&self, namespace: Namespace) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .data
            .read()
            .keys()
            .filter(|(ns, _)| *ns == namespace)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}
