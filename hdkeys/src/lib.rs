//! hdkeys - BIP32 hierarchical deterministic keys
//!
//! This library derives trees of secp256k1 keys from a single seed, encodes
//! them as Base58Check extended keys and tags them with SLIP-132 version
//! bytes so wallets can tell which coin and address format a key is for.

pub mod error;
pub mod crypto;
pub mod bip32;
pub mod bip44;
pub mod account;

// Re-export commonly used types for convenience
pub use account::{DerivationResult, Generator, KeyPath};
pub use bip32::{ExtendedKey, Path, Registry, VersionBytes};
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
