//! Structural credential redaction.
//!
//! Walks the JSON value tree and replaces the value of every object key
//! literally named `password` (case-sensitive, exact match) with a fixed
//! mask, recursing through nested objects and arrays. Operating on the
//! parsed tree rather than the serialized text means the mask applies
//! regardless of formatting, escaping, or nesting depth.
//!
//! This is the one safety-critical contract in the pipeline: no credential
//! material may reach the remote log sink.

use serde_json::Value;

/// Replacement value for redacted fields.
pub const MASK: &str = "*****";

/// Redact every `password` field in the value tree.
pub fn mask_passwords(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    if key == "password" {
                        (key, Value::String(MASK.to_string()))
                    } else {
                        (key, mask_passwords(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(mask_passwords).collect()),
        other => other,
    }
}
