//! Checksummed serialization and Base58Check encoding of extended keys

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use super::key::{ExtendedKey, KEY_LENGTH};
use crate::crypto::checksum;
use crate::error::{Error, Result};

/// Size of a serialized key: 78 bytes plus a 4-byte checksum
pub const SERIALIZED_LENGTH: usize = KEY_LENGTH + 4;

/// Append the double-SHA256 checksum to the 78-byte record.
///
/// An all-zero key is rejected with [`Error::EmptyKey`].
pub fn serialize(key: &ExtendedKey) -> Result<[u8; SERIALIZED_LENGTH]> {
    if key.is_empty() {
        return Err(Error::EmptyKey);
    }

    let mut data = [0u8; SERIALIZED_LENGTH];
    data[..KEY_LENGTH].copy_from_slice(key.as_bytes());
    data[KEY_LENGTH..].copy_from_slice(&checksum(key.as_bytes()));
    Ok(data)
}

/// Parse an 82-byte serialized key and verify its checksum.
///
/// Input of any other length yields [`Error::WrongSize`] carrying the input
/// truncated or zero-padded to 78 bytes.
pub fn deserialize(data: &[u8]) -> Result<ExtendedKey> {
    if data.len() != SERIALIZED_LENGTH {
        let mut partial = [0u8; KEY_LENGTH];
        let take = data.len().min(KEY_LENGTH);
        partial[..take].copy_from_slice(&data[..take]);
        return Err(Error::WrongSize {
            actual: data.len(),
            partial: ExtendedKey::from_bytes(partial),
        });
    }

    let (payload, expected) = data.split_at(KEY_LENGTH);
    if checksum(payload) != expected {
        return Err(Error::InvalidChecksum);
    }

    let mut bytes = [0u8; KEY_LENGTH];
    bytes.copy_from_slice(payload);
    Ok(ExtendedKey::from_bytes(bytes))
}

/// Encode bytes with the Bitcoin Base58 alphabet
pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decode a Bitcoin Base58 string
pub fn base58_decode(encoded: &str) -> Result<Vec<u8>> {
    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| Error::InvalidBase58(e.to_string()))
}

impl ExtendedKey {
    /// Serialize and Base58-encode this key
    pub fn to_base58(&self) -> Result<String> {
        Ok(base58_encode(&serialize(self)?))
    }

    /// Decode a Base58 serialized key
    pub fn from_base58(encoded: &str) -> Result<Self> {
        deserialize(&base58_decode(encoded)?)
    }

    /// Whether the key survives a serialize/deserialize round trip
    pub fn is_valid(&self) -> bool {
        serialize(self).and_then(|data| deserialize(&data)).is_ok()
    }
}

impl fmt::Display for ExtendedKey {
    /// Base58 form; an empty key renders as an empty string
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_base58() {
            Ok(encoded) => f.write_str(&encoded),
            Err(_) => Ok(()),
        }
    }
}

impl FromStr for ExtendedKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ExtendedKey::from_base58(s.trim())
    }
}

impl Serialize for ExtendedKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let encoded = self.to_base58().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }
}

impl<'de> Deserialize<'de> for ExtendedKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = ExtendedKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a base58 encoded extended key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ExtendedKey, E> {
                ExtendedKey::from_base58(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bip32::key::{ChainCode, Fingerprint, KeyBytes};

    fn sample() -> ExtendedKey {
        ExtendedKey::new(
            0x0488ade4,
            1,
            Fingerprint([1, 2, 3, 4]),
            5,
            ChainCode([7; 32]),
            KeyBytes::from_private(&[9; 32]),
        )
    }

    #[test]
    fn test_serialize_appends_checksum() {
        let key = sample();
        let data = serialize(&key).unwrap();
        assert_eq!(&data[..78], key.as_bytes());
        assert_eq!(&data[78..], &checksum(key.as_bytes()));
    }

    #[test]
    fn test_serialize_empty_key() {
        let empty = ExtendedKey::from_bytes([0; KEY_LENGTH]);
        assert!(matches!(serialize(&empty), Err(Error::EmptyKey)));
        assert_eq!(empty.to_string(), "");
        assert!(!empty.is_valid());
    }

    #[test]
    fn test_deserialize_round_trip() {
        let key = sample();
        let data = serialize(&key).unwrap();
        assert_eq!(deserialize(&data).unwrap(), key);
        assert!(key.is_valid());
    }

    #[test]
    fn test_deserialize_short_input_is_padded() {
        let data = serialize(&sample()).unwrap();
        match deserialize(&data[..50]) {
            Err(Error::WrongSize { actual, partial }) => {
                assert_eq!(actual, 50);
                assert_eq!(&partial.as_bytes()[..50], &data[..50]);
                assert!(partial.as_bytes()[50..].iter().all(|&b| b == 0));
            }
            other => panic!("expected WrongSize, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_long_input_is_truncated() {
        let mut data = serialize(&sample()).unwrap().to_vec();
        data.push(0xff);
        match deserialize(&data) {
            Err(Error::WrongSize { actual, partial }) => {
                assert_eq!(actual, 83);
                assert_eq!(partial, sample());
            }
            other => panic!("expected WrongSize, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_bad_checksum() {
        let mut data = serialize(&sample()).unwrap();
        data[81] ^= 0x01;
        assert!(matches!(deserialize(&data), Err(Error::InvalidChecksum)));
    }

    #[test]
    fn test_base58_round_trip() {
        let data = [0u8, 0, 1, 2, 3, 255];
        let encoded = base58_encode(&data);
        assert!(encoded.starts_with("11"));
        assert_eq!(base58_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn test_base58_rejects_invalid_characters() {
        assert!(matches!(base58_decode("0OIl"), Err(Error::InvalidBase58(_))));
    }

    #[test]
    fn test_from_str_and_display() {
        let key = sample();
        let encoded = key.to_string();
        assert!(encoded.starts_with("xprv"));
        assert_eq!(encoded.parse::<ExtendedKey>().unwrap(), key);
    }

    #[test]
    fn test_serde_as_base58_string() {
        let key = sample();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key));
        let back: ExtendedKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
