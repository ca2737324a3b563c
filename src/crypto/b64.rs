use base64::{engine::general_purpose::STANDARD, DecodeError, Engine};
use serde::{Deserialize, Deserializer, Serializer};

/// Base64 encode the provided buffer using the standard alphabet with padding
pub fn b64_encode(x: impl AsRef<[u8]>) -> String {
    STANDARD.encode(x)
}

pub fn b64_decode(x: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
    STANDARD.decode(x)
}

/// Serde adapter storing byte buffers as base64 strings.
pub(crate) mod serde_b64 {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&b64_encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        b64_decode(encoded).map_err(serde::de::Error::custom)
    }
}
