//! BIP44 coin metadata

pub mod coin;

pub use coin::{coin_by_type, Coin, COINS};
