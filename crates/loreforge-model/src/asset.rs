//! Content-addressed binary assets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Minimal one-pixel PNG served when a requested asset cannot be found.
///
/// Clients render it as a broken image instead of stalling the load.
pub const BROKEN_IMAGE_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00,
    0x0d, 0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
    0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4, 0x89,
    0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x62,
    0x00, 0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4,
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60,
    0x82,
];

/// Identity of an asset: the blake3 hash of its content.
///
/// Hex-encoded on the wire so clients can use it as a cache filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey([u8; 32]);

impl AssetKey {
    /// Hashes `data` to produce its key.
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Parses a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, ModelError> {
        let mut bytes = [0u8; 32];
        if s.len() != 64 {
            return Err(ModelError::BadAssetKey(s.to_string()));
        }
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hi = hex_val(chunk[0]);
            let lo = hex_val(chunk[1]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => bytes[i] = (hi << 4) | lo,
                _ => return Err(ModelError::BadAssetKey(s.to_string())),
            }
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for AssetKey {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AssetKey {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AssetKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A content-addressed binary blob (typically an image).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub key: AssetKey,
    pub name: String,
    pub data: Vec<u8>,
}

impl Asset {
    /// Creates an asset, deriving its key from the content.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            key: AssetKey::of(&data),
            name: name.into(),
            data,
        }
    }

    /// Synthesizes the broken-image placeholder for a missing asset.
    ///
    /// Keeps the *requested* key so the client's pending lookup resolves;
    /// the content is the placeholder PNG.
    pub fn broken_image(key: AssetKey) -> Self {
        Self {
            key,
            name: "broken-image".to_string(),
            data: BROKEN_IMAGE_PNG.to_vec(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}
