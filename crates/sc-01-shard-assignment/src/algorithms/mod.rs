//! # Algorithms Module
//!
//! Core algorithms for the shard assigner.

pub mod shard_assignment;

pub use shard_assignment::{assign_shard, keccak256};
