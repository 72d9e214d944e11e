//! SLIP-44 registered coin types

use std::fmt;

use serde::Serialize;

use crate::bip32::FIRST_HARDENED_CHILD;

/// A coin type usable as the second component of a BIP44 path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    #[serde(rename = "type")]
    pub coin_type: u32,
    /// `coin_type` with the hardened offset applied
    pub path_component: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub symbol: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub name: &'static str,
}

impl Coin {
    pub const fn new(coin_type: u32, symbol: &'static str, name: &'static str) -> Self {
        Coin {
            coin_type,
            path_component: coin_type.wrapping_add(FIRST_HARDENED_CHILD),
            symbol,
            name,
        }
    }

    pub fn is_valid(&self) -> bool {
        let labelled = !self.name.trim().is_empty() || !self.symbol.trim().is_empty();
        labelled
            && self.coin_type < FIRST_HARDENED_CHILD
            && self.path_component >= FIRST_HARDENED_CHILD
            && self.coin_type + FIRST_HARDENED_CHILD == self.path_component
    }
}

impl fmt::Display for Coin {
    /// `BTC - Bitcoin (Type 0)`, or `Testnet (Type 1)` without a symbol
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbol.is_empty() {
            write!(f, "{} (Type {})", self.name, self.coin_type)
        } else {
            write!(f, "{} - {} (Type {})", self.symbol, self.name, self.coin_type)
        }
    }
}

/// Coins referenced by the version bytes registry
pub static COINS: &[Coin] = &[
    Coin::new(0, "BTC", "Bitcoin"),
    Coin::new(1, "", "Testnet (all coins)"),
    Coin::new(2, "LTC", "Litecoin"),
    Coin::new(17, "GRS", "Groestlcoin"),
    Coin::new(28, "VTC", "Vertcoin"),
    Coin::new(57, "SYS", "Syscoin"),
    Coin::new(1997, "POLIS", "Polis"),
    Coin::new(29223, "NEXA", "Nexa"),
];

/// Look up a coin by its unhardened type
pub fn coin_by_type(coin_type: u32) -> Option<&'static Coin> {
    COINS.iter().find(|coin| coin.coin_type == coin_type)
}
