//! # Adapter Implementations
//!
//! Concrete implementations of the outbound ports declared in
//! `shared-types`:
//!
//! | Port | Adapter |
//! |------|---------|
//! | `RecordStore` | [`FileBackedRecordStore`] |
//! | `LedgerGateway` | [`SimulatedLedger`] |

pub mod simulated_ledger;
pub mod storage;

pub use simulated_ledger::SimulatedLedger;
pub use storage::{DataDirLock, FileBackedRecordStore, LockError};
