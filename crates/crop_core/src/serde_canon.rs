//! Canonical JSON for artifact files
//!
//! Artifacts are written with recursively sorted object keys and no
//! whitespace, so equal values always produce equal bytes and the manifest
//! digests are stable across runs.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanonicalError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Serialize a value to canonical JSON (sorted keys, no whitespace)
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<String, CanonicalError> {
    let value = serde_json::to_value(value)
        .map_err(|e| CanonicalError::SerializationError(e.to_string()))?;
    serde_json::to_string(&sorted(value))
        .map_err(|e| CanonicalError::SerializationError(e.to_string()))
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sorted(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// Blake3 digest of raw bytes as a 64-character hex string
pub fn digest_hex(bytes: &[u8]) -> String {
    hex::encode(blake3::hash(bytes).as_bytes())
}
