//! Radix-64 (standard base64, padded) encoding of binary payloads.
//!
//! File payloads and thumbnails are raw bytes in memory and radix-64 text in
//! every serialized document. The `radix64` and `radix64_opt` modules plug
//! into `#[serde(with = ...)]`.

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;

use docshelf_core::result::AppResult;

/// Encode bytes as standard padded base64 text.
pub fn encode(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

/// Decode standard padded base64 text back into bytes.
pub fn decode(text: &str) -> AppResult<Bytes> {
    Ok(Bytes::from(general_purpose::STANDARD.decode(text)?))
}

/// Serde adapter for a required binary field.
pub mod radix64 {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode(&text).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for an optional binary field.
pub mod radix64_opt {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        data: &Option<Bytes>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match data {
            Some(bytes) => serializer.serialize_some(&super::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Bytes>, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        text.map(|t| super::decode(&t).map_err(serde::de::Error::custom))
            .transpose()
    }
}
