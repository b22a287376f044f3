//! # Value Objects
//!
//! Immutable ownership table mapping shards to responsible nodes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::errors::{NodeId, ShardError, ShardId};

/// Static shard → owning node table.
///
/// Supplied externally at startup and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTable {
    owners: BTreeMap<ShardId, NodeId>,
}

impl OwnershipTable {
    /// Empty table (no shard is owned).
    pub fn new() -> Self {
        Self::default()
    }

    /// Table where `node` owns shards `0..shard_count`.
    pub fn single_owner(node: &str, shard_count: u16) -> Self {
        let owners = (0..shard_count).map(|s| (s, node.to_string())).collect();
        Self { owners }
    }

    /// Assign `shard` to `node`, replacing any previous owner.
    pub fn assign(mut self, shard: ShardId, node: impl Into<NodeId>) -> Self {
        self.owners.insert(shard, node.into());
        self
    }

    /// Owner of `shard`, if any.
    pub fn owner_of(&self, shard: ShardId) -> Option<&str> {
        self.owners.get(&shard).map(String::as_str)
    }

    /// Shards owned by `node`, ascending.
    pub fn shards_owned_by(&self, node: &str) -> Vec<ShardId> {
        self.owners
            .iter()
            .filter(|(_, owner)| owner.as_str() == node)
            .map(|(shard, _)| *shard)
            .collect()
    }

    /// Highest shard index present.
    pub fn max_shard(&self) -> Option<ShardId> {
        self.owners.keys().next_back().copied()
    }

    /// Number of owned shards.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no shard has an owner.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Parse `"0-7=node-a,8-15=node-b,16=node-c"`.
    ///
    /// Ranges are inclusive. Later entries win on overlap.
    pub fn parse(owners: &str) -> Result<Self, ShardError> {
        let mut table = Self::new();

        for entry in owners.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (range, node) = entry.split_once('=').ok_or_else(|| {
                ShardError::ConfigError(format!("ownership entry '{entry}' is missing '='"))
            })?;
            let node = node.trim();
            if node.is_empty() {
                return Err(ShardError::ConfigError(format!(
                    "ownership entry '{entry}' has no node"
                )));
            }

            let (start, end) = match range.split_once('-') {
                Some((start, end)) => (parse_shard(start)?, parse_shard(end)?),
                None => {
                    let shard = parse_shard(range)?;
                    (shard, shard)
                }
            };
            if start > end {
                return Err(ShardError::ConfigError(format!(
                    "ownership range {start}-{end} is reversed"
                )));
            }

            for shard in start..=end {
                table.owners.insert(shard, node.to_string());
            }
        }

        Ok(table)
    }
}

fn parse_shard(raw: &str) -> Result<ShardId, ShardError> {
    raw.trim()
        .parse::<ShardId>()
        .map_err(|_| ShardError::ConfigError(format!("invalid shard index '{}'", raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ranges() {
        let table = OwnershipTable::parse("0-7=node-a, 8-15=node-b").unwrap();
        assert_eq!(table.len(), 16);
        assert_eq!(table.owner_of(0), Some("node-a"));
        assert_eq!(table.owner_of(7), Some("node-a"));
        assert_eq!(table.owner_of(8), Some("node-b"));
        assert_eq!(table.owner_of(16), None);
        assert_eq!(table.max_shard(), Some(15));
    }

    #[test]
    fn test_parse_single_shard_and_overlap() {
        let table = OwnershipTable::parse("0-3=node-a,2=node-b").unwrap();
        assert_eq!(table.shards_owned_by("node-a"), vec![0, 1, 3]);
        assert_eq!(table.shards_owned_by("node-b"), vec![2]);
    }

    #[test]
    fn test_parse_empty_is_empty_table() {
        assert!(OwnershipTable::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(OwnershipTable::parse("0-7").is_err());
        assert!(OwnershipTable::parse("0-7=").is_err());
        assert!(OwnershipTable::parse("7-0=node-a").is_err());
        assert!(OwnershipTable::parse("x=node-a").is_err());
    }

    #[test]
    fn test_single_owner() {
        let table = OwnershipTable::single_owner("node-a", 4);
        assert_eq!(table.shards_owned_by("node-a"), vec![0, 1, 2, 3]);
    }
}
