//! # Storage Adapters
//!
//! Durable record store and the data-directory lock that guards it.

pub mod file_store;
pub mod lock;

pub use file_store::FileBackedRecordStore;
pub use lock::{DataDirLock, LockError};
