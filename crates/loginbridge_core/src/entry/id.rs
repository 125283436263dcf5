//! Entry identifier.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a native entry.
///
/// Entry IDs are 128-bit values that are:
/// - Unique within a database
/// - Immutable once the entry is stored
/// - Exchanged with callers as 32 lowercase hex digits
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId([u8; 16]);

impl EntryId {
    /// Length of the hex form.
    pub const HEX_LEN: usize = 32;

    /// Creates an entry ID from raw bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates a new random entry ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    /// Returns the lowercase hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses the hex form. Upper case digits are accepted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUniqueId` unless the text is exactly 32 hex digits.
    pub fn from_hex(text: &str) -> CoreResult<Self> {
        if text.len() != Self::HEX_LEN {
            return Err(CoreError::invalid_unique_id(text));
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(text, &mut bytes).map_err(|_| CoreError::invalid_unique_id(text))?;
        Ok(Self(bytes))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.to_hex())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 16]> for EntryId {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl Serialize for EntryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        EntryId::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_unique() {
        let id1 = EntryId::new();
        let id2 = EntryId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn hex_is_lowercase_and_fixed_length() {
        let id = EntryId::from_bytes([0xAB; 16]);
        let text = id.to_hex();
        assert_eq!(text.len(), EntryId::HEX_LEN);
        assert_eq!(text, "ab".repeat(16));
    }

    #[test]
    fn hex_roundtrip() {
        let id = EntryId::new();
        assert_eq!(EntryId::from_hex(&id.to_hex()).unwrap(), id);
        assert_eq!(EntryId::from_hex(&id.to_hex().to_uppercase()).unwrap(), id);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(EntryId::from_hex("").is_err());
        assert!(EntryId::from_hex("abcd").is_err());
        assert!(EntryId::from_hex(&"zz".repeat(16)).is_err());
        assert!(EntryId::from_hex(&"00".repeat(17)).is_err());
    }

    #[test]
    fn ordering() {
        let id1 = EntryId::from_bytes([0; 16]);
        let id2 = EntryId::from_bytes([1; 16]);
        assert!(id1 < id2);
    }
}
