//! The 78-byte extended key record
//!
//! Layout (big-endian multi-byte fields):
//!
//! | Offset | Size | Field              |
//! |--------|------|--------------------|
//! | 0      | 4    | version            |
//! | 4      | 1    | depth              |
//! | 5      | 4    | parent fingerprint |
//! | 9      | 4    | child number       |
//! | 13     | 32   | chain code         |
//! | 45     | 33   | key material       |
//!
//! Key material is either a compressed public key or `0x00` followed by the
//! 32-byte private scalar.

use std::fmt;
use std::ops::Range;

use crate::crypto::{hash160, scalar_base_multiply};
use crate::error::Result;

/// Size of the unchecksummed extended key record
pub const KEY_LENGTH: usize = 78;

/// Index of the first hardened child
pub const FIRST_HARDENED_CHILD: u32 = 0x8000_0000;

const VERSION: Range<usize> = 0..4;
const DEPTH: usize = 4;
const FINGERPRINT: Range<usize> = 5..9;
const CHILD_NUMBER: Range<usize> = 9..13;
const CHAIN_CODE: Range<usize> = 13..45;
const KEY_MATERIAL: Range<usize> = 45..78;
const PRIVATE_KEY: Range<usize> = 46..78;

/// Chain code for BIP32 key derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainCode(pub [u8; 32]);

impl ChainCode {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Key fingerprint (first 4 bytes of HASH160 of public key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint(pub [u8; 4]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Calculate fingerprint from a compressed public key
    pub fn from_public_key(public_key: &[u8; 33]) -> Self {
        let hash = hash160(public_key);
        Fingerprint([hash[0], hash[1], hash[2], hash[3]])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// 33 bytes of key material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBytes(pub [u8; 33]);

impl KeyBytes {
    /// Wrap a private scalar as `0x00 || scalar`
    pub fn from_private(scalar: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 33];
        bytes[1..].copy_from_slice(scalar);
        KeyBytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    pub fn is_private(&self) -> bool {
        self.0[0] == 0
    }
}

/// A BIP32 extended key, private or public.
///
/// Values are never changed in place; every setter returns a new key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtendedKey([u8; KEY_LENGTH]);

impl ExtendedKey {
    /// Assemble a key from its fields
    pub fn new(
        version: u32,
        depth: u8,
        parent_fingerprint: Fingerprint,
        child_number: u32,
        chain_code: ChainCode,
        key: KeyBytes,
    ) -> Self {
        let mut bytes = [0u8; KEY_LENGTH];
        bytes[VERSION].copy_from_slice(&version.to_be_bytes());
        bytes[DEPTH] = depth;
        bytes[FINGERPRINT].copy_from_slice(parent_fingerprint.as_bytes());
        bytes[CHILD_NUMBER].copy_from_slice(&child_number.to_be_bytes());
        bytes[CHAIN_CODE].copy_from_slice(chain_code.as_bytes());
        bytes[KEY_MATERIAL].copy_from_slice(key.as_bytes());
        ExtendedKey(bytes)
    }

    /// Wrap raw bytes without validation
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        ExtendedKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    pub fn version(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    pub fn depth(&self) -> u8 {
        self.0[DEPTH]
    }

    pub fn parent_fingerprint(&self) -> Fingerprint {
        Fingerprint([self.0[5], self.0[6], self.0[7], self.0[8]])
    }

    pub fn child_number(&self) -> u32 {
        u32::from_be_bytes([self.0[9], self.0[10], self.0[11], self.0[12]])
    }

    /// Whether this key was produced by hardened derivation
    pub fn is_hardened(&self) -> bool {
        self.child_number() >= FIRST_HARDENED_CHILD
    }

    pub fn chain_code(&self) -> ChainCode {
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&self.0[CHAIN_CODE]);
        ChainCode(chain_code)
    }

    pub fn key_bytes(&self) -> KeyBytes {
        let mut key = [0u8; 33];
        key.copy_from_slice(&self.0[KEY_MATERIAL]);
        KeyBytes(key)
    }

    /// Key material starts with `0x00` for private keys
    pub fn is_private(&self) -> bool {
        self.0[KEY_MATERIAL.start] == 0
    }

    /// All 78 bytes are zero
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// The private scalar, if this is a private key
    pub fn private_key(&self) -> Option<[u8; 32]> {
        if !self.is_private() {
            return None;
        }
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&self.0[PRIVATE_KEY]);
        Some(scalar)
    }

    /// The compressed public key, computed from the scalar for private keys
    pub fn public_key(&self) -> Result<[u8; 33]> {
        match self.private_key() {
            Some(scalar) => scalar_base_multiply(&scalar),
            None => Ok(self.key_bytes().0),
        }
    }

    /// Fingerprint identifying this key to its children
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        Ok(Fingerprint::from_public_key(&self.public_key()?))
    }

    /// Copy of this key with another version flag
    pub fn with_version(&self, version: u32) -> Self {
        let mut bytes = self.0;
        bytes[VERSION].copy_from_slice(&version.to_be_bytes());
        ExtendedKey(bytes)
    }

    /// Private scalar in hex without `0x` prefix
    pub fn private_key_hex(&self) -> Option<String> {
        self.private_key().map(hex::encode)
    }

    /// Compressed public key in hex without `0x` prefix
    pub fn public_key_hex(&self) -> Result<String> {
        Ok(hex::encode(self.public_key()?))
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("version", &format_args!("{:#010x}", self.version()))
            .field("depth", &self.depth())
            .field("parent_fingerprint", &format_args!("{}", self.parent_fingerprint()))
            .field("child_number", &self.child_number())
            .field("private", &self.is_private())
            .finish_non_exhaustive()
    }
}
