//! Derivation of every key along a path from a root key

use serde::Serialize;
use tracing::debug;

use crate::bip32::{base58_encode, master_key_with_version, ExtendedKey, Path, VersionBytes, DEFAULT_MAINNET};
use crate::crypto::checksum;
use crate::error::{Error, Result};

/// Shortest seed accepted by [`Generator::from_seed_hex`], in bytes
pub const MIN_SEED_LENGTH: usize = 16;

/// A derived key together with the path that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyPath {
    pub path: Path,
    pub key: ExtendedKey,
}

impl KeyPath {
    /// Private key in Wallet Import Format, if the key is private
    pub fn private_key_wif(&self, compressed: bool, network_prefix: u8) -> Option<String> {
        let secret = self.key.private_key()?;

        let mut payload = Vec::with_capacity(38);
        payload.push(network_prefix);
        payload.extend_from_slice(&secret);
        if compressed {
            payload.push(0x01);
        }
        let check = checksum(&payload);
        payload.extend_from_slice(&check);
        Some(base58_encode(&payload))
    }
}

/// Keys from the root down to a leaf, root first
pub type DerivationResult = Vec<KeyPath>;

/// Derives key trees from a validated root key
#[derive(Debug, Clone)]
pub struct Generator {
    root_key: ExtendedKey,
}

impl Generator {
    /// Build a generator from a hex encoded seed of at least 16 bytes
    pub fn from_seed_hex(seed: &str) -> Result<Self> {
        Self::from_seed_hex_with_version(seed, &DEFAULT_MAINNET)
    }

    /// Like [`Generator::from_seed_hex`], tagging the tree with `version`
    pub fn from_seed_hex_with_version(seed: &str, version: &VersionBytes) -> Result<Self> {
        let seed = hex::decode(seed.trim())?;
        if seed.len() < MIN_SEED_LENGTH {
            return Err(Error::InvalidSeed(format!(
                "expected at least {} bytes, got {}",
                MIN_SEED_LENGTH,
                seed.len()
            )));
        }

        Self::from_root_key(master_key_with_version(&seed, version)?)
    }

    /// Use an existing master key; it must be a valid private key at depth 0
    pub fn from_root_key(root_key: ExtendedKey) -> Result<Self> {
        if !root_key.is_valid() {
            return Err(Error::InvalidRootKey("key does not serialize".to_string()));
        }
        if !root_key.is_private() {
            return Err(Error::InvalidRootKey("key is not private".to_string()));
        }
        if root_key.depth() != 0 {
            return Err(Error::InvalidRootKey(format!(
                "expected depth 0, got {}",
                root_key.depth()
            )));
        }
        Ok(Generator { root_key })
    }

    pub fn root_key(&self) -> &ExtendedKey {
        &self.root_key
    }

    /// Derive every key along `path`, starting with `m` itself
    pub fn derive(&self, path: &Path) -> Result<DerivationResult> {
        let mut result = Vec::with_capacity(path.depth() + 1);
        let mut current = self.root_key;
        result.push(KeyPath {
            path: Path::master(),
            key: current,
        });

        for prefix in path.prefixes().skip(1) {
            let index = prefix.value_at_depth(prefix.depth())?;
            current = current.derive_child(index)?;
            result.push(KeyPath {
                path: prefix,
                key: current,
            });
        }

        debug!(path = %path, keys = result.len(), "derived key path");
        Ok(result)
    }
}
