//! # File-Backed Record Store
//!
//! Durable [`RecordStore`] for a single engine instance. The whole store is
//! held in memory and rewritten to one file on every mutation.
//!
//! ## File Format
//!
//! ```text
//! [key_len:u32 LE][namespace "/" key][value_len:u32 LE][value] ...
//! ```
//!
//! Writes go to `records.tmp`, are synced, then renamed over
//! `records.bin`. A truncated tail is ignored on load.

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use shared_types::{Namespace, RecordStore, StoreError};
use tracing::{info, warn};

use super::lock::{DataDirLock, LockError};

type RecordMap = HashMap<(Namespace, String), Vec<u8>>;

/// Record store persisted under a locked data directory.
pub struct FileBackedRecordStore {
    data: RwLock<RecordMap>,
    path: PathBuf,
    _lock: DataDirLock,
}

impl FileBackedRecordStore {
    /// Data file name inside the data directory.
    pub const DATA_FILE: &'static str = "records.bin";

    /// Lock `data_dir` and load any existing records.
    ///
    /// A missing data file starts an empty store; any other read error is
    /// returned.
    pub fn open(data_dir: &Path) -> Result<Self, LockError> {
        let lock = DataDirLock::acquire(data_dir)?;
        let path = data_dir.join(Self::DATA_FILE);

        let data = match std::fs::read(&path) {
            Ok(bytes) => {
                let data = decode(&bytes);
                info!(
                    "[sc-store] 💾 Loaded {} records from {}",
                    data.len(),
                    path.display()
                );
                data
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("[sc-store] 📁 No existing record file at {}", path.display());
                RecordMap::new()
            }
            Err(source) => return Err(LockError::ReadFailed { path, source }),
        };

        Ok(Self {
            data: RwLock::new(data),
            path,
            _lock: lock,
        })
    }

    /// Path of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total number of stored values.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn save(&self, data: &RecordMap) -> Result<(), StoreError> {
        let bytes = encode(data);
        let temp_path = self.path.with_extension("tmp");

        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;
        Ok(())
    }

    /// Insert (`Some`) or remove (`None`) and persist. The in-memory map is
    /// restored when the file cannot be written.
    fn mutate(&self, namespace: Namespace, key: &str, value: Option<&[u8]>) -> Result<(), StoreError> {
        let mut data = self.data.write();
        let map_key = (namespace, key.to_string());
        let previous = match value {
            Some(value) => data.insert(map_key.clone(), value.to_vec()),
            None => data.remove(&map_key),
        };

        if let Err(err) = self.save(&data) {
            match previous {
                Some(old) => data.insert(map_key, old),
                None => data.remove(&map_key),
            };
            return Err(err);
        }
        Ok(())
    }
}

impl RecordStore for FileBackedRecordStore {
    fn put(&self, namespace: Namespace, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.mutate(namespace, key, Some(value))
    }

    fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.read().get(&(namespace, key.to_string())).cloned())
    }

    fn delete(&self, namespace: Namespace, key: &str) -> Result<(), StoreError> {
        if !self.data.read().contains_key(&(namespace, key.to_string())) {
            return Ok(());
        }
        self.mutate(namespace, key, None)
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

fn io_error(err: std::io::Error) -> StoreError {
    StoreError::Io {
        message: err.to_string(),
    }
}

fn encode(data: &RecordMap) -> Vec<u8> {
    let mut entries: Vec<_> = data.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut bytes = Vec::new();
    for ((namespace, key), value) in entries {
        let full_key = format!("{}/{}", namespace.as_str(), key);
        bytes.extend_from_slice(&(full_key.len() as u32).to_le_bytes());
        bytes.extend_from_slice(full_key.as_bytes());
        bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
        bytes.extend_from_slice(value);
    }
    bytes
}

fn decode(bytes: &[u8]) -> RecordMap {
    let mut data = RecordMap::new();
    let mut cursor = 0;

    while let Some((full_key, value)) = read_entry(bytes, &mut cursor) {
        let parsed = std::str::from_utf8(full_key).ok().and_then(|full_key| {
            let (ns, key) = full_key.split_once('/')?;
            Some((Namespace::parse(ns)?, key.to_string()))
        });
        match parsed {
            Some(map_key) => {
                data.insert(map_key, value.to_vec());
            }
            None => warn!("[sc-store] Skipping record with unrecognised key"),
        }
    }

    if cursor < bytes.len() {
        warn!(
            offset = cursor,
            len = bytes.len(),
            "[sc-store] Ignoring truncated tail of record file"
        );
    }
    data
}

fn read_entry<'a>(bytes: &'a [u8], cursor: &mut usize) -> Option<(&'a [u8], &'a [u8])> {
    let mut at = *cursor;
    let key = read_chunk(bytes, &mut at)?;
    let value = read_chunk(bytes, &mut at)?;
    *cursor = at;
    Some((key, value))
}

fn read_chunk<'a>(bytes: &'a [u8], at: &mut usize) -> Option<&'a [u8]> {
    let len_end = at.checked_add(4)?;
    let len = u32::from_le_bytes(bytes.get(*at..len_end)?.try_into().ok()?) as usize;
    let end = len_end.checked_add(len)?;
    let chunk = bytes.get(len_end..end)?;
    *at = end;
    Some(chunk)
}
