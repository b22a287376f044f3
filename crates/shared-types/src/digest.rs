//! # Metadata Digest
//!
//! Fixed-size content hash written to ledgers instead of full payloads.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// SHA-256 of the canonical JSON encoding of `value`, lowercase hex.
///
/// Object keys are sorted recursively so logically equal payloads hash the
/// same regardless of construction order.
pub fn metadata_digest(value: &Value) -> String {
    let canonical = canonicalize(value);
    let encoded = canonical.to_string();

    let mut hasher = Sha256::new();
    hasher.update(encoded.as_bytes());
    hex::encode(hasher.finalize())
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_digest_is_hex_sha256() {
        let digest = metadata_digest(&json!({"id": "S1"}));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_digest_ignores_key_order() {
        let a = json!({"a": 1, "b": {"y": true, "x": [1, 2]}});
        let b = json!({"b": {"x": [1, 2], "y": true}, "a": 1});
        assert_eq!(metadata_digest(&a), metadata_digest(&b));
    }

    #[test]
    fn test_digest_differs_on_content() {
        assert_ne!(
            metadata_digest(&json!({"id": "S1"})),
            metadata_digest(&json!({"id": "S2"}))
        );
    }
}
