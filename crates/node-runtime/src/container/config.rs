//! # Node Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! Read once from `SC_*` environment variables at startup; nothing is
//! hot-reloaded.
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `SC_BLOCKCHAIN_ENABLED` | Ledger integration master switch |
//! | `SC_WRITE_INTERVAL_MS` | Flush interval, `0` = synchronous writes |
//! | `SC_PRIMARY_CHAIN` | Chain written when locally responsible |
//! | `SC_TRACKING_PREFIX` | Prefix of generated tracking numbers |
//! | `SC_SHARDING_ENABLED`, `SC_SHARD_COUNT`, `SC_NODE_ID` | Sharding |
//! | `SC_SHARD_OWNERS` | `0-7=node-a,8-15=node-b` |
//! | `SC_BRIDGE_ENABLED` | Bridge master switch |
//! | `SC_BRIDGE_VERIFICATION_THRESHOLD` | Accepted, not consumed |
//! | `SC_BRIDGE_PERSIST_INTERVAL_MS` | Transfer snapshot interval |
//! | `SC_CHAINS` | `ethereum=http://...,polygon=http://...` |
//! | `SC_CHAIN_<NAME>_ENABLED` | Per-chain switch |
//! | `SC_DATA_DIR` | Directory of the record store |

use std::path::PathBuf;
use std::str::FromStr;

use sc_01_shard_assignment::{OwnershipTable, ShardConfig, ShardError};
use sc_02_write_batcher::BatcherConfig;
use sc_03_bridge::BridgeConfig;
use shared_types::ChainId;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable could not be parsed.
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
        /// Parse failure.
        reason: String,
    },

    /// Primary chain is not among the enabled chains.
    #[error("Primary chain {0} is not configured or not enabled")]
    UnknownPrimaryChain(String),

    /// Shard configuration is inconsistent.
    #[error("Sharding: {0}")]
    Sharding(#[from] ShardError),
}

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Write batcher configuration.
    pub batcher: BatcherConfig,
    /// Shard assignment configuration.
    pub sharding: ShardConfig,
    /// Bridge configuration.
    pub bridge: BridgeConfig,
    /// Configured chains, enabled or not.
    pub chains: Vec<ChainEndpoint>,
    /// Storage configuration.
    pub storage: StorageConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let chains = vec![
            ChainEndpoint::new("ethereum", "http://localhost:8545"),
            ChainEndpoint::new("polygon", "http://localhost:8546"),
        ];
        let bridge = BridgeConfig {
            chains: chains.iter().map(|c| c.chain.clone()).collect(),
            ..BridgeConfig::default()
        };
        Self {
            batcher: BatcherConfig::default(),
            sharding: ShardConfig::default(),
            bridge,
            chains,
            storage: StorageConfig::default(),
        }
    }
}

/// A chain and its gateway endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEndpoint {
    /// Chain identifier.
    pub chain: ChainId,
    /// Gateway endpoint.
    pub endpoint: String,
    /// Per-chain switch.
    pub enabled: bool,
}

impl ChainEndpoint {
    /// Enabled endpoint.
    pub fn new(chain: &str, endpoint: &str) -> Self {
        Self {
            chain: ChainId::new(chain),
            endpoint: endpoint.to_string(),
            enabled: true,
        }
    }

    /// Parse `"ethereum=http://a,polygon=http://b"`. An entry without `=`
    /// gets an empty endpoint.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, ConfigError> {
        let mut chains: Vec<Self> = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (name, endpoint) = entry.split_once('=').unwrap_or((entry, ""));
            let name = name.trim();
            if name.is_empty() {
                return Err(invalid("SC_CHAINS", raw, "chain name is empty"));
            }
            let chain = Self::new(name, endpoint.trim());
            if chains.iter().any(|c| c.chain == chain.chain) {
                return Err(invalid("SC_CHAINS", raw, &format!("chain {name} listed twice")));
            }
            chains.push(chain);
        }
        Ok(chains)
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Data directory for the record store.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl NodeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup, starting from defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let env = Env(&lookup);

        // Ledger integration
        if let Some(enabled) = env.parse_bool("SC_BLOCKCHAIN_ENABLED")? {
            config.batcher.blockchain_enabled = enabled;
        }
        if let Some(interval) = env.parse::<u64>("SC_WRITE_INTERVAL_MS")? {
            config.batcher.write_interval_ms = interval;
        }
        if let Some(primary) = env.get("SC_PRIMARY_CHAIN") {
            config.batcher.primary_chain = ChainId::new(primary);
        }
        if let Some(prefix) = env.get("SC_TRACKING_PREFIX") {
            config.batcher.tracking_prefix = prefix;
        }

        // Chains
        if let Some(raw) = env.get("SC_CHAINS") {
            config.chains = ChainEndpoint::parse_list(&raw)?;
        }
        for endpoint in &mut config.chains {
            let key = format!("SC_CHAIN_{}_ENABLED", endpoint.chain.as_str().to_uppercase());
            if let Some(enabled) = env.parse_bool(&key)? {
                endpoint.enabled = enabled;
            }
        }

        // Sharding
        if let Some(enabled) = env.parse_bool("SC_SHARDING_ENABLED")? {
            config.sharding.enabled = enabled;
        }
        if let Some(node_id) = env.get("SC_NODE_ID") {
            config.sharding.node_id = node_id;
        }
        if let Some(count) = env.parse::<u16>("SC_SHARD_COUNT")? {
            config.sharding.shard_count = count;
        }
        config.sharding.owners = match env.get("SC_SHARD_OWNERS") {
            Some(raw) => OwnershipTable::parse(&raw)?,
            None => OwnershipTable::single_owner(&config.sharding.node_id, config.sharding.shard_count),
        };

        // Bridge
        if let Some(enabled) = env.parse_bool("SC_BRIDGE_ENABLED")? {
            config.bridge.enabled = enabled;
        }
        if let Some(threshold) = env.parse::<u32>("SC_BRIDGE_VERIFICATION_THRESHOLD")? {
            config.bridge.verification_threshold = threshold;
        }
        if let Some(interval) = env.parse::<u64>("SC_BRIDGE_PERSIST_INTERVAL_MS")? {
            config.bridge.persist_interval_ms = interval;
        }

        // Storage
        if let Some(dir) = env.get("SC_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }

        config.bridge.chains = config.enabled_chains().cloned().collect();
        config.batcher.bridge_enabled = config.bridge.enabled;
        config.validate()?;
        Ok(config)
    }

    /// Enabled chains, in configuration order.
    pub fn enabled_chains(&self) -> impl Iterator<Item = &ChainId> {
        self.chains.iter().filter(|c| c.enabled).map(|c| &c.chain)
    }

    /// Check cross-subsystem consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sharding.validate()?;
        if self.batcher.blockchain_enabled
            && !self.enabled_chains().any(|c| *c == self.batcher.primary_chain)
        {
            return Err(ConfigError::UnknownPrimaryChain(
                self.batcher.primary_chain.to_string(),
            ));
        }
        Ok(())
    }
}

struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| raw.parse::<T>().map_err(|e| invalid(key, &raw, &e.to_string())))
            .transpose()
    }

    fn parse_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|raw| match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(invalid(key, &raw, "expected true or false")),
            })
            .transpose()
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
