//! # Shard Assignment Algorithm
//!
//! Deterministic `Keccak256(id) mod N` assignment. The hash input is the
//! UTF-8 encoding of the identifier, so the result is independent of
//! machine, locale and process.

use crate::domain::ShardId;
use sha3::{Digest, Keccak256};

/// Modulo-based shard assignment.
///
/// The first 8 bytes of the digest are read big-endian before reduction,
/// which keeps the bias for any `shard_count <= 1024` negligible.
pub fn assign_shard(id: &str, shard_count: u16) -> ShardId {
    if shard_count == 0 {
        return 0;
    }

    let hash = keccak256(id.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash[..8]);
    let value = u64::from_be_bytes(prefix);
    (value % u64::from(shard_count)) as ShardId
}

/// Helper: keccak256 hash.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    #[test]
    fn test_assign_shard_deterministic() {
        let shard1 = assign_shard("abc123", 16);
        let shard2 = assign_shard("abc123", 16);
        assert_eq!(shard1, shard2);
    }

    #[test]
    fn test_assign_shard_within_range() {
        for i in 0..200 {
            let shard = assign_shard(&format!("VCN{i:012}"), 16);
            assert!(shard < 16);
        }
    }

    #[test]
    fn test_assign_shard_zero_count() {
        assert_eq!(assign_shard("S1", 0), 0);
    }

    #[test]
    fn test_single_shard_always_zero() {
        assert_eq!(assign_shard("S1", 1), 0);
        assert_eq!(assign_shard("S2", 1), 0);
    }

    #[test]
    fn test_keccak_known_vector() {
        // Keccak-256 of the empty string.
        let hash = keccak256(b"");
        assert_eq!(hash[0], 0xc5);
        assert_eq!(hash[1], 0xd2);
        assert_eq!(hash[31], 0x70);
    }

    #[test]
    fn test_random_ids_cover_all_shards() {
        let mut rng = rand::thread_rng();
        let mut seen = [false; 8];

        for _ in 0..2_000 {
            let len = rng.gen_range(1..32);
            let id: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect();
            seen[assign_shard(&id, 8) as usize] = true;
        }

        assert!(seen.iter().all(|hit| *hit));
    }
}
