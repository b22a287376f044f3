//! # Ports Module
//!
//! API trait for the shard assigner. The assigner has no outbound
//! dependencies.

pub mod inbound;

pub use inbound::ShardingApi;
