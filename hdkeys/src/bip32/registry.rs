//! SLIP-132 version bytes registry
//!
//! Every extended key carries a 4-byte version flag that tells a wallet which
//! coin and address format the key belongs to. The table below is the
//! canonical list; [`Registry`] indexes it once for reverse lookups.
//!
//! Several entries share a private flag (`xprv` is used by Bitcoin,
//! Groestlcoin and Vertcoin). Lookups by flag return entries in table order
//! and derivation always uses the first one.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use super::key::FIRST_HARDENED_CHILD;
use crate::error::{Error, Result};

/// Address formats a version flag is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddrEncoding {
    #[serde(rename = "P2PKH")]
    P2pkh,
    #[serde(rename = "P2SH")]
    P2sh,
    #[serde(rename = "P2WPKH")]
    P2wpkh,
    #[serde(rename = "P2WPKHInP2SH")]
    P2wpkhInP2sh,
    #[serde(rename = "P2WSH")]
    P2wsh,
    #[serde(rename = "P2WSHInP2SH")]
    P2wshInP2sh,
    #[serde(rename = "P2PKT")]
    P2pkt,
}

impl AddrEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddrEncoding::P2pkh => "P2PKH",
            AddrEncoding::P2sh => "P2SH",
            AddrEncoding::P2wpkh => "P2WPKH",
            AddrEncoding::P2wpkhInP2sh => "P2WPKH-in-P2SH",
            AddrEncoding::P2wsh => "P2WSH",
            AddrEncoding::P2wshInP2sh => "P2WSH-in-P2SH",
            AddrEncoding::P2pkt => "P2PKT",
        }
    }
}

impl fmt::Display for AddrEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version flags and metadata for one coin/format pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionBytes {
    pub coin: &'static str,
    pub private_flag: u32,
    /// First four characters of a Base58 private key with this flag
    pub private_prefix: &'static str,
    pub public_flag: u32,
    pub public_prefix: &'static str,
    pub addr_encodings: &'static [AddrEncoding],
    /// Purpose and coin components, e.g. `m/44'/0'`
    pub path: &'static str,
}

fn canonical_path_regex() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^m/\d{0,8}'/\d{0,8}'$"))
        .as_ref()
        .map_err(|e| Error::UnsupportedOrInvalidPath(e.to_string()))
}

impl VersionBytes {
    pub fn private_flag_bytes(&self) -> [u8; 4] {
        self.private_flag.to_be_bytes()
    }

    pub fn public_flag_bytes(&self) -> [u8; 4] {
        self.public_flag.to_be_bytes()
    }

    /// The canonical path has exactly a hardened purpose and a hardened coin
    pub fn is_valid(&self) -> bool {
        canonical_path_regex()
            .map(|re| re.is_match(self.path))
            .unwrap_or(false)
    }

    /// Whether some registry entry uses the same canonical path
    pub fn is_registered(&self) -> bool {
        Registry::global().by_path(self.path).is_some()
    }

    /// Purpose without the hardened offset
    pub fn purpose_value(&self) -> Result<u32> {
        self.path_component(1, Error::InvalidPurpose)
    }

    /// Coin type without the hardened offset
    pub fn coin_value(&self) -> Result<u32> {
        self.path_component(2, Error::InvalidCoin)
    }

    /// Purpose as it appears in a derivation path index
    pub fn purpose_value_full(&self) -> Result<u32> {
        Ok(self.purpose_value()? + FIRST_HARDENED_CHILD)
    }

    /// Coin type as it appears in a derivation path index
    pub fn coin_value_full(&self) -> Result<u32> {
        Ok(self.coin_value()? + FIRST_HARDENED_CHILD)
    }

    fn path_component(&self, position: usize, invalid: fn(String) -> Error) -> Result<u32> {
        if !self.is_valid() {
            return Err(Error::UnsupportedHdVersionBytes(self.private_flag));
        }

        let component = self.path.split('/').nth(position).unwrap_or_default();
        let value = component
            .trim_end_matches('\'')
            .parse::<u32>()
            .map_err(|_| invalid(component.to_string()))?;
        if value >= FIRST_HARDENED_CHILD {
            return Err(invalid(component.to_string()));
        }
        Ok(value)
    }
}

const fn entry(
    coin: &'static str,
    private_flag: u32,
    private_prefix: &'static str,
    public_flag: u32,
    public_prefix: &'static str,
    addr_encodings: &'static [AddrEncoding],
    path: &'static str,
) -> VersionBytes {
    VersionBytes {
        coin,
        private_flag,
        private_prefix,
        public_flag,
        public_prefix,
        addr_encodings,
        path,
    }
}

use AddrEncoding::*;

const LEGACY: &[AddrEncoding] = &[P2pkh, P2sh];

/// Bitcoin mainnet `xprv`/`xpub`, the flags of a fresh master key
pub const DEFAULT_MAINNET: VersionBytes = entry(
    "Bitcoin", 0x0488ade4, "xprv", 0x0488b21e, "xpub", LEGACY, "m/44'/0'",
);

/// Bitcoin testnet `tprv`/`tpub`
pub const DEFAULT_TESTNET: VersionBytes = entry(
    "Bitcoin Testnet", 0x04358394, "tprv", 0x043587cf, "tpub", LEGACY, "m/44'/1'",
);

/// Canonical list; order decides which entry wins for a shared flag
#[rustfmt::skip]
pub static VERSION_BYTES: &[VersionBytes] = &[
    DEFAULT_MAINNET,
    entry("Bitcoin", 0x049d7878, "yprv", 0x049d7cb2, "ypub", &[P2wpkhInP2sh], "m/49'/0'"),
    entry("Bitcoin", 0x04b2430c, "zprv", 0x04b24746, "zpub", &[P2wpkh], "m/84'/0'"),
    entry("Bitcoin", 0x0295b005, "Yprv", 0x0295b43f, "Ypub", &[P2wshInP2sh], "m/84'/0'"),
    entry("Bitcoin", 0x02aa7a99, "Zprv", 0x02aa7ed3, "Zpub", &[P2wsh], "m/84'/0'"),
    DEFAULT_TESTNET,
    entry("Groestlcoin Testnet", 0x04358394, "tprv", 0x043587cf, "tpub", LEGACY, "m/44'/1'"),
    entry("Litecoin Testnet", 0x0436ef7d, "ttpv", 0x0436f6e1, "ttub", LEGACY, "m/44'/1'"),
    entry("Nexa Testnet", 0x04358394, "xprv", 0x043587cf, "xpub", LEGACY, "m/44'/1'"),
    entry("Bitcoin Testnet", 0x044a4e28, "uprv", 0x044a5262, "upub", &[P2wpkhInP2sh], "m/49'/1'"),
    entry("Groestlcoin Testnet", 0x044a4e28, "uprv", 0x044a5262, "upub", &[P2wpkhInP2sh], "m/49'/1'"),
    entry("Bitcoin Testnet", 0x045f18bc, "vprv", 0x045f1cf6, "vpub", &[P2wpkh], "m/84'/1'"),
    entry("Bitcoin Testnet", 0x024285b5, "Uprv", 0x024289ef, "Upub", &[P2wshInP2sh], "m/84'/1'"),
    entry("Bitcoin Testnet", 0x02575048, "Vprv", 0x02575483, "Vpub", &[P2wsh], "m/84'/1'"),
    entry("Groestlcoin Testnet", 0x045f18bc, "vprv", 0x045f1cf6, "vpub", &[P2wpkh], "m/84'/1'"),
    entry("Groestlcoin Testnet", 0x024285b5, "Uprv", 0x024289ef, "Upub", &[P2wshInP2sh], "m/84'/1'"),
    entry("Groestlcoin Testnet", 0x02575048, "Vprv", 0x02575483, "Vpub", &[P2wsh], "m/84'/1'"),
    entry("Groestlcoin", 0x0488ade4, "xprv", 0x0488b21e, "xpub", LEGACY, "m/44'/17'"),
    entry("Groestlcoin", 0x049d7878, "yprv", 0x049d7cb2, "ypub", &[P2wpkhInP2sh], "m/49'/17'"),
    entry("Groestlcoin", 0x04b2430c, "zprv", 0x04b24746, "zpub", &[P2wpkh], "m/84'/17'"),
    entry("Groestlcoin", 0x0295b005, "Yprv", 0x0295b43f, "Ypub", &[P2wshInP2sh], "m/84'/17'"),
    entry("Groestlcoin", 0x02aa7a99, "Zprv", 0x02aa7ed3, "Zpub", &[P2wsh], "m/84'/17'"),
    entry("Litecoin", 0x019d9cfe, "Ltpv", 0x019da462, "Ltub", LEGACY, "m/44'/2'"),
    entry("Litecoin", 0x01b26792, "Mtpv", 0x01b26ef6, "Mtub", &[P2wpkhInP2sh], "m/49'/2'"),
    entry("Nexa", 0x426c6b73, "xprv", 0x42696720, "xpub", &[P2pkt, P2pkh, P2sh], "m/44'/29223'"),
    entry("Vertcoin", 0x0488ade4, "vtcv", 0x0488b21e, "vtcp", LEGACY, "m/44'/28'"),
    entry("Polis", 0x03e25945, "pprv", 0x03e25d7e, "ppub", &[P2pkh], "m/44'/1997'"),
    entry("Syscoin", 0x04b2430c, "zprv", 0x04b24746, "zpub", &[P2wpkh], "m/84'/57'"),
    entry("Syscoin", 0x02aa7a99, "Zprv", 0x02aa7ed3, "Zpub", &[P2wsh], "m/84'/57'"),
];

type Index<K> = HashMap<K, Vec<&'static VersionBytes>>;

/// Reverse lookup tables over [`VERSION_BYTES`]
#[derive(Debug)]
pub struct Registry {
    entries: &'static [VersionBytes],
    by_private_flag: Index<u32>,
    by_public_flag: Index<u32>,
    by_purpose: Index<u32>,
    by_purpose_full: Index<u32>,
    by_coin: Index<u32>,
    by_path: Index<&'static str>,
}

impl Registry {
    /// The process-wide registry, built on first use
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(|| Registry::build(VERSION_BYTES))
    }

    /// Index a table of entries
    pub fn build(entries: &'static [VersionBytes]) -> Self {
        let mut registry = Registry {
            entries,
            by_private_flag: HashMap::new(),
            by_public_flag: HashMap::new(),
            by_purpose: HashMap::new(),
            by_purpose_full: HashMap::new(),
            by_coin: HashMap::new(),
            by_path: HashMap::new(),
        };

        for version in entries {
            registry.by_private_flag.entry(version.private_flag).or_default().push(version);
            registry.by_public_flag.entry(version.public_flag).or_default().push(version);
            registry.by_path.entry(version.path).or_default().push(version);

            match (version.purpose_value(), version.coin_value()) {
                (Ok(purpose), Ok(coin)) => {
                    registry.by_purpose.entry(purpose).or_default().push(version);
                    registry
                        .by_purpose_full
                        .entry(purpose + FIRST_HARDENED_CHILD)
                        .or_default()
                        .push(version);
                    registry.by_coin.entry(coin).or_default().push(version);
                }
                (Err(e), _) | (_, Err(e)) => {
                    warn!(coin = version.coin, path = version.path, error = %e, "skipping purpose/coin index for entry");
                }
            }
        }

        debug!(
            entries = entries.len(),
            private_flags = registry.by_private_flag.len(),
            public_flags = registry.by_public_flag.len(),
            "built version bytes registry"
        );
        registry
    }

    /// All entries in canonical order
    pub fn entries(&self) -> &'static [VersionBytes] {
        self.entries
    }

    pub fn by_private_flag(&self, flag: u32) -> Option<&[&'static VersionBytes]> {
        self.by_private_flag.get(&flag).map(Vec::as_slice)
    }

    pub fn by_public_flag(&self, flag: u32) -> Option<&[&'static VersionBytes]> {
        self.by_public_flag.get(&flag).map(Vec::as_slice)
    }

    /// Entries for a purpose without the hardened offset, e.g. `84`
    pub fn by_purpose(&self, purpose: u32) -> Option<&[&'static VersionBytes]> {
        self.by_purpose.get(&purpose).map(Vec::as_slice)
    }

    /// Entries for a hardened purpose index, e.g. `84 + 2^31`
    pub fn by_purpose_full(&self, purpose: u32) -> Option<&[&'static VersionBytes]> {
        self.by_purpose_full.get(&purpose).map(Vec::as_slice)
    }

    /// Entries for a coin type without the hardened offset
    pub fn by_coin(&self, coin: u32) -> Option<&[&'static VersionBytes]> {
        self.by_coin.get(&coin).map(Vec::as_slice)
    }

    pub fn by_path(&self, path: &str) -> Option<&[&'static VersionBytes]> {
        self.by_path.get(path).map(Vec::as_slice)
    }

    /// First entry whose private or public flag equals `flag`
    pub fn lookup(&self, flag: u32, private: bool) -> Option<&'static VersionBytes> {
        let found = if private {
            self.by_private_flag(flag)
        } else {
            self.by_public_flag(flag)
        };
        found.and_then(|entries| entries.first().copied())
    }
}
