//! Chain hash type for transaction identification.
//!
//! Provides a `Hash` type over 32 bytes displayed as byte-reversed hex,
//! matching the convention for transaction IDs: internal (wire) order is
//! little-endian, display order is big-endian.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize, Serializer, Deserializer};
use crate::hash::sha256d;
use crate::PrimitivesError;

/// Size of a Hash in bytes.
pub const HASH_SIZE: usize = 32;

/// A 32-byte hash used for transaction IDs.
///
/// Stored in internal (wire) byte order; `Display` reverses the bytes
/// into the conventional hex form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Create a Hash from raw bytes in internal order.
    pub fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create a Hash from a byte slice in internal order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != HASH_SIZE {
            return Err(PrimitivesError::InvalidHash(
                format!("invalid hash length of {}, want {}", bytes.len(), HASH_SIZE)
            ));
        }
        let mut arr = [0u8; HASH_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Hash(arr))
    }

    /// Parse a byte-reversed (display-order) hex string.
    ///
    /// This is the form transaction IDs appear in everywhere user-facing:
    /// explorers, RPC, test fixtures.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.len() != HASH_SIZE * 2 {
            return Err(PrimitivesError::InvalidHash(
                format!("hash hex must be {} characters, got {}", HASH_SIZE * 2, hex_str.len())
            ));
        }
        let decoded = hex::decode(hex_str)?;
        let mut internal = [0u8; HASH_SIZE];
        for (i, b) in decoded.iter().enumerate() {
            internal[HASH_SIZE - 1 - i] = *b;
        }
        Ok(Hash(internal))
    }

    /// The internal (wire-order) byte array.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// A copy of the internal bytes.
    pub fn to_bytes(&self) -> [u8; HASH_SIZE] {
        self.0
    }
}

/// Display the hash as byte-reversed hex.
impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        write!(f, "{}", hex::encode(reversed))
    }
}

impl FromStr for Hash {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
    }
}

/// Serialize as a display-order hex string in JSON.
impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Deserialize from a display-order hex string in JSON.
impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute double SHA-256 of the input and return it as a Hash.
///
/// This is how transaction IDs are derived from serialized bytes.
pub fn double_hash(data: &[u8]) -> Hash {
    Hash(sha256d(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let display = "d171f063d8dc05c5c231dba5f59bb56fcb3ba286dcc782fe5b307e27275cb6e2";
        let hash = Hash::from_hex(display).unwrap();
        assert_eq!(hash.to_string(), display);
        // First internal byte is the last display byte pair.
        assert_eq!(hash.as_bytes()[0], 0xe2);
        assert_eq!(hash.as_bytes()[31], 0xd1);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(Hash::from_hex("").is_err());
        assert!(Hash::from_hex("d171f063").is_err());
        assert!(Hash::from_hex(&"0".repeat(66)).is_err());
    }

    #[test]
    fn test_from_hex_rejects_bad_characters() {
        assert!(Hash::from_hex(&"g".repeat(64)).is_err());
    }

    #[test]
    fn test_double_hash() {
        assert_eq!(
            hex::encode(double_hash(b"hello").as_bytes()),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn test_serde_json_roundtrip() {
        let display = "d171f063d8dc05c5c231dba5f59bb56fcb3ba286dcc782fe5b307e27275cb6e2";
        let hash = Hash::from_hex(display).unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", display));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
