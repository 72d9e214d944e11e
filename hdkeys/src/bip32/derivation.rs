//! BIP32 key derivation

use tracing::{debug, trace};

use super::key::{ChainCode, ExtendedKey, Fingerprint, KeyBytes, FIRST_HARDENED_CHILD};
use super::path::Path;
use super::registry::{Registry, VersionBytes, DEFAULT_MAINNET};
use crate::crypto::curve::validate_child_public_key;
use crate::crypto::{add_points, add_scalars_mod_n, hmac_sha512, scalar_base_multiply};
use crate::error::{Error, Result};

pub use crate::crypto::validate_private_scalar;

/// HMAC key for master key generation
const MASTER_SECRET: &[u8] = b"Bitcoin seed";

fn split(intermediary: &[u8; 64]) -> ([u8; 32], ChainCode) {
    let mut il = [0u8; 32];
    let mut chain_code = [0u8; 32];
    il.copy_from_slice(&intermediary[..32]);
    chain_code.copy_from_slice(&intermediary[32..]);
    (il, ChainCode(chain_code))
}

/// Create a Bitcoin mainnet (`xprv`) master key from a seed
pub fn master_key(seed: &[u8]) -> Result<ExtendedKey> {
    master_key_with_version(seed, &DEFAULT_MAINNET)
}

/// Create a master key tagged with the private flag of `version`
pub fn master_key_with_version(seed: &[u8], version: &VersionBytes) -> Result<ExtendedKey> {
    let intermediary = hmac_sha512(MASTER_SECRET, &[seed])?;
    let (secret, chain_code) = split(&intermediary);
    validate_private_scalar(&secret)?;

    debug!(
        seed_len = seed.len(),
        version = version.private_flag,
        "created master key"
    );
    Ok(ExtendedKey::new(
        version.private_flag,
        0,
        Fingerprint::default(),
        0,
        chain_code,
        KeyBytes::from_private(&secret),
    ))
}

/// Derive the child at `index` (CKDpriv for private parents, CKDpub for public).
///
/// Indices at or above [`FIRST_HARDENED_CHILD`] need a private parent. The
/// child keeps the parent's version flag, which must be registered.
pub fn child_key(parent: &ExtendedKey, index: u32) -> Result<ExtendedKey> {
    let hardened = index >= FIRST_HARDENED_CHILD;
    let private_secret = parent.private_key();
    if private_secret.is_none() && hardened {
        return Err(Error::HardenedChildOfPublicKey);
    }

    let parent_public = parent.public_key()?;
    let index_bytes = index.to_be_bytes();
    let chain_code = parent.chain_code();
    let intermediary = match (&private_secret, hardened) {
        (Some(secret), true) => {
            hmac_sha512(chain_code.as_bytes(), &[&[0u8][..], &secret[..], &index_bytes[..]])?
        }
        _ => hmac_sha512(chain_code.as_bytes(), &[&parent_public[..], &index_bytes[..]])?,
    };
    let (il, child_chain_code) = split(&intermediary);

    let version = Registry::global()
        .lookup(parent.version(), parent.is_private())
        .ok_or(Error::UnsupportedHdVersionBytes(parent.version()))?;

    let fingerprint = Fingerprint::from_public_key(&parent_public);
    let depth = parent.depth().wrapping_add(1);

    let child = match private_secret {
        Some(secret) => {
            let child_secret = add_scalars_mod_n(&il, &secret)?;
            validate_private_scalar(&child_secret)?;
            ExtendedKey::new(
                version.private_flag,
                depth,
                fingerprint,
                index,
                child_chain_code,
                KeyBytes::from_private(&child_secret),
            )
        }
        None => {
            let tweak_point =
                scalar_base_multiply(&il).map_err(|_| Error::InvalidPublicKey)?;
            validate_child_public_key(&tweak_point)?;
            let child_public = add_points(&tweak_point, &parent_public)?;
            validate_child_public_key(&child_public)?;
            ExtendedKey::new(
                version.public_flag,
                depth,
                fingerprint,
                index,
                child_chain_code,
                KeyBytes(child_public),
            )
        }
    };

    trace!(
        depth,
        index,
        hardened,
        private = child.is_private(),
        parent_fingerprint = %fingerprint,
        "derived child key"
    );
    Ok(child)
}

/// Public counterpart of `key`.
///
/// The version becomes the registered public flag, or `xpub` when the
/// private flag is unknown. A public key only has its version normalized.
pub fn neuter(key: &ExtendedKey) -> Result<ExtendedKey> {
    let registry = Registry::global();
    match key.private_key() {
        Some(secret) => {
            let version = registry
                .lookup(key.version(), true)
                .map_or(DEFAULT_MAINNET.public_flag, |v| v.public_flag);
            Ok(ExtendedKey::new(
                version,
                key.depth(),
                key.parent_fingerprint(),
                key.child_number(),
                key.chain_code(),
                KeyBytes(scalar_base_multiply(&secret)?),
            ))
        }
        None => {
            if registry.lookup(key.version(), false).is_some() {
                Ok(*key)
            } else {
                Ok(key.with_version(DEFAULT_MAINNET.public_flag))
            }
        }
    }
}

impl ExtendedKey {
    /// Derive the direct child at `index`
    pub fn derive_child(&self, index: u32) -> Result<ExtendedKey> {
        child_key(self, index)
    }

    /// Derive every index of `path` in turn, starting from this key
    pub fn derive_path(&self, path: &Path) -> Result<ExtendedKey> {
        path.values_at_depth()
            .iter()
            .try_fold(*self, |key, &index| child_key(&key, index))
    }

    /// Public counterpart of this key
    pub fn neuter(&self) -> Result<ExtendedKey> {
        neuter(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bip32::registry::DEFAULT_TESTNET;

    const SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn master() -> ExtendedKey {
        master_key(&hex::decode(SEED).unwrap()).unwrap()
    }

    #[test]
    fn test_master_key_fields() {
        let key = master();
        assert_eq!(key.version(), 0x0488ade4);
        assert_eq!(key.depth(), 0);
        assert_eq!(key.parent_fingerprint(), Fingerprint::default());
        assert_eq!(key.child_number(), 0);
        assert!(key.is_private());
        assert_eq!(
            key.private_key_hex().unwrap(),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(key.chain_code().as_bytes()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
    }

    #[test]
    fn test_master_key_with_testnet_version() {
        let key = master_key_with_version(&hex::decode(SEED).unwrap(), &DEFAULT_TESTNET).unwrap();
        assert_eq!(key.version(), 0x04358394);
        assert!(key.to_string().starts_with("tprv"));
        assert_eq!(key.private_key(), master().private_key());
    }

    #[test]
    fn test_child_key_links_to_parent() {
        let parent = master();
        let child = child_key(&parent, FIRST_HARDENED_CHILD).unwrap();
        assert_eq!(child.depth(), 1);
        assert_eq!(child.child_number(), FIRST_HARDENED_CHILD);
        assert_eq!(child.parent_fingerprint(), parent.fingerprint().unwrap());
        assert_eq!(child.version(), parent.version());
        assert_eq!(child.parent_fingerprint().to_string(), "3442193e");
    }

    #[test]
    fn test_hardened_child_of_public_key_fails() {
        let public = neuter(&master()).unwrap();
        assert!(matches!(
            child_key(&public, FIRST_HARDENED_CHILD + 1),
            Err(Error::HardenedChildOfPublicKey)
        ));
    }

    #[test]
    fn test_public_derivation_matches_private() {
        let parent = child_key(&master(), FIRST_HARDENED_CHILD).unwrap();
        let via_private = neuter(&child_key(&parent, 1).unwrap()).unwrap();
        let via_public = child_key(&neuter(&parent).unwrap(), 1).unwrap();
        assert_eq!(via_private, via_public);
        assert_eq!(via_public.version(), 0x0488b21e);
    }

    #[test]
    fn test_unregistered_version_is_rejected() {
        let key = master().with_version(0xdeadbeef);
        assert!(matches!(
            child_key(&key, 0),
            Err(Error::UnsupportedHdVersionBytes(0xdeadbeef))
        ));
    }

    #[test]
    fn test_neuter_uses_registered_counterpart() {
        let zprv = master().with_version(0x04b2430c);
        let zpub = neuter(&zprv).unwrap();
        assert_eq!(zpub.version(), 0x04b24746);
        assert!(!zpub.is_private());
        assert_eq!(zpub.public_key().unwrap(), zprv.public_key().unwrap());
        assert_eq!(zpub.chain_code(), zprv.chain_code());
        assert_eq!(neuter(&zpub).unwrap(), zpub);
    }

    #[test]
    fn test_neuter_unregistered_falls_back_to_xpub() {
        let private = master().with_version(0x01020304);
        assert_eq!(neuter(&private).unwrap().version(), 0x0488b21e);

        let public = neuter(&master()).unwrap().with_version(0x01020304);
        assert_eq!(neuter(&public).unwrap().version(), 0x0488b21e);
    }

    #[test]
    fn test_neuter_leaves_original_untouched() {
        let key = master();
        let _ = key.neuter().unwrap();
        assert!(key.is_private());
    }

    #[test]
    fn test_derive_path_equals_stepwise() {
        let path = Path::parse("m/0'/1").unwrap();
        let direct = master().derive_path(&path).unwrap();
        let stepwise = master()
            .derive_child(FIRST_HARDENED_CHILD)
            .and_then(|k| k.derive_child(1))
            .unwrap();
        assert_eq!(direct, stepwise);
        assert_eq!(master().derive_path(&Path::master()).unwrap(), master());
    }

    #[test]
    fn test_depth_wraps() {
        let mut bytes = *master().as_bytes();
        bytes[4] = 255;
        let deep = ExtendedKey::from_bytes(bytes);
        assert_eq!(child_key(&deep, 0).unwrap().depth(), 0);
    }
}
