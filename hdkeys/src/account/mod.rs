//! Root key handling and multi-level derivation

pub mod generator;

pub use generator::{DerivationResult, Generator, KeyPath, MIN_SEED_LENGTH};
