//! # Subsystem Container
//!
//! Configuration and the container that owns every subsystem instance.

pub mod config;
pub mod subsystems;

pub use config::{ChainEndpoint, ConfigError, NodeConfig, StorageConfig};
pub use subsystems::{ContainerError, SubsystemContainer};
