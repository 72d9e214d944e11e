//! Error types for the hdkeys library

use thiserror::Error;

use crate::bip32::ExtendedKey;

/// Custom error type for key derivation and encoding operations
#[derive(Error, Debug)]
pub enum Error {
    /// Derivation path does not match `m(/\d+'?)*` or holds an out of range component
    #[error("path is unsupported and/or invalid: {0}")]
    UnsupportedOrInvalidPath(String),

    /// Private scalar is zero or not below the curve order
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// Derived public key is degenerate
    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("can't create hardened child for public key")]
    HardenedChildOfPublicKey,

    #[error("checksum doesn't match")]
    InvalidChecksum,

    /// Serialized key is not 82 bytes long.
    ///
    /// `partial` holds the input truncated or zero-padded to 78 bytes. It is
    /// never a validated key.
    #[error("serialized keys should be exactly 82 bytes, got {actual}")]
    WrongSize { actual: usize, partial: ExtendedKey },

    #[error("unsupported hd version bytes: {0:#010x}")]
    UnsupportedHdVersionBytes(u32),

    #[error("key is empty")]
    EmptyKey,

    #[error("invalid purpose: {0}")]
    InvalidPurpose(String),

    #[error("invalid coin: {0}")]
    InvalidCoin(String),

    #[error("invalid base58 string: {0}")]
    InvalidBase58(String),

    #[error("provided seed is not valid: {0}")]
    InvalidSeed(String),

    #[error("root key is invalid: {0}")]
    InvalidRootKey(String),

    #[error("HMAC error: {0}")]
    Hmac(String),

    #[error("hex decoding error: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Result type for hdkeys operations
pub type Result<T> = std::result::Result<T, Error>;
