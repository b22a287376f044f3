//! # Domain Module
//!
//! Core domain types for the bridge coordinator.

pub mod book;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use book::{TransferBook, TransferMap};
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
