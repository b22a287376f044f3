//! # Algorithms Module
//!
//! Transfer id derivation.

pub mod transfer_id;

pub use transfer_id::{derive_transfer_id, TRANSFER_ID_LEN};
