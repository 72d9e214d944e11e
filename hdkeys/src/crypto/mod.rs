//! Cryptographic primitives
//!
//! This module provides the hashing and secp256k1 arithmetic that key
//! derivation and serialization are built on.

pub mod curve;
pub mod hash;

pub use curve::{
    add_points, add_scalars_mod_n, expand, scalar_base_multiply, validate_private_scalar,
};
pub use hash::{checksum, hash160, hmac_sha512, sha256d};
