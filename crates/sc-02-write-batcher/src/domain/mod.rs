//! # Domain Module
//!
//! Core domain types for the write batcher.

pub mod entities;
pub mod errors;
pub mod pending;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use pending::{PendingBatch, PendingQueue};
pub use value_objects::*;
