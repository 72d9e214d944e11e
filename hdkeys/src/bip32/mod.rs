//! BIP32 hierarchical deterministic keys
//!
//! This module provides the extended key record, its Base58Check encoding,
//! the SLIP-132 version bytes registry, derivation paths and the CKD
//! functions that tie them together.

pub mod codec;
pub mod derivation;
pub mod key;
pub mod path;
pub mod registry;

pub use codec::{base58_decode, base58_encode, deserialize, serialize, SERIALIZED_LENGTH};
pub use derivation::{child_key, master_key, master_key_with_version, neuter, validate_private_scalar};
pub use key::{ChainCode, ExtendedKey, Fingerprint, KeyBytes, FIRST_HARDENED_CHILD, KEY_LENGTH};
pub use path::Path;
pub use registry::{AddrEncoding, Registry, VersionBytes, DEFAULT_MAINNET, DEFAULT_TESTNET, VERSION_BYTES};
