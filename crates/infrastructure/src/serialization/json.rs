//! JSON serialization helpers for deterministic output.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),
}

/// Serializes a value to deterministic JSON bytes.
///
/// Output format:
/// - 2-space indentation
/// - Trailing newline
/// - Keys sorted alphabetically (requires `BTreeMap` in source types)
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    buffer.push(b'\n');
    Ok(buffer)
}

/// Deserializes JSON from bytes.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_stable_output_is_sorted_indented_and_terminated() {
        let mut map = BTreeMap::new();
        map.insert("refreshToken", "R1");
        map.insert("accessToken", "A1");

        let bytes = to_json_stable_bytes(&map).expect("serialization should work");
        let json = String::from_utf8(bytes).expect("utf-8");

        assert_eq!(
            json,
            "{\n  \"accessToken\": \"A1\",\n  \"refreshToken\": \"R1\"\n}\n"
        );
    }

    #[test]
    fn test_from_json_bytes_rejects_garbage() {
        let result: Result<BTreeMap<String, String>, _> = from_json_bytes(b"{\"key\": }");
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
