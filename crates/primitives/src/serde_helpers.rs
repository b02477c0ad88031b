//! Serde helper modules for byte fields in JSON documents.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Deserializer, Serializer, de::Error};

/// Serialize/deserialize a byte vector as a standard base64 string.
pub mod serde_base64 {
    use super::*;

    pub fn serialize<S: Serializer>(v: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(v))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        STANDARD
            .decode(&s)
            .map_err(|e| D::Error::custom(format!("invalid base64 '{s}': {e}")))
    }
}
