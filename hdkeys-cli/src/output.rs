//! Rendering of command results as text or JSON

use std::fmt::Write;

use anyhow::Result;
use serde::Serialize;

use hdkeys::bip44::coin_by_type;
use hdkeys::{ExtendedKey, Registry, VersionBytes};

use crate::config::OutputFormat;

/// Printable summary of one extended key
#[derive(Debug, Clone, Serialize)]
pub struct KeyView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub key: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin: Option<&'static str>,
    pub private: bool,
    pub depth: u8,
    pub parent_fingerprint: String,
    pub fingerprint: String,
    pub child_number: u32,
    pub hardened: bool,
    pub chain_code: String,
    pub public_key: String,
}

impl KeyView {
    pub fn new(path: Option<String>, key: &ExtendedKey) -> Result<Self> {
        let coin = Registry::global()
            .lookup(key.version(), key.is_private())
            .map(|version| version.coin);

        Ok(Self {
            path,
            key: key.to_base58()?,
            version: format!("{:#010x}", key.version()),
            coin,
            private: key.is_private(),
            depth: key.depth(),
            parent_fingerprint: key.parent_fingerprint().to_string(),
            fingerprint: key.fingerprint()?.to_string(),
            child_number: key.child_number(),
            hardened: key.is_hardened(),
            chain_code: hex::encode(key.chain_code().as_bytes()),
            public_key: key.public_key_hex()?,
        })
    }
}

/// Printable summary of one registry entry
#[derive(Debug, Clone, Serialize)]
pub struct VersionView {
    #[serde(flatten)]
    pub version: VersionBytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slip44: Option<String>,
}

impl From<&VersionBytes> for VersionView {
    fn from(version: &VersionBytes) -> Self {
        let slip44 = version
            .coin_value()
            .ok()
            .and_then(coin_by_type)
            .map(|coin| coin.to_string());
        Self {
            version: *version,
            slip44,
        }
    }
}

/// Render derived keys; text output lists one key per line
pub fn render_keys(keys: &[KeyView], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(keys)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for view in keys {
                match &view.path {
                    Some(path) => writeln!(out, "{:<24} {}", path, view.key)?,
                    None => writeln!(out, "{}", view.key)?,
                }
            }
            Ok(out)
        }
    }
}

/// Render every field of a single key
pub fn render_inspection(view: &KeyView, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(view)?);
    }

    let mut out = String::new();
    writeln!(out, "version:            {} ({})", view.version, view.coin.unwrap_or("unregistered"))?;
    writeln!(out, "private:            {}", view.private)?;
    writeln!(out, "depth:              {}", view.depth)?;
    writeln!(out, "parent fingerprint: {}", view.parent_fingerprint)?;
    writeln!(out, "fingerprint:        {}", view.fingerprint)?;
    writeln!(
        out,
        "child number:       {}{}",
        view.child_number,
        if view.hardened { " (hardened)" } else { "" }
    )?;
    writeln!(out, "chain code:         {}", view.chain_code)?;
    writeln!(out, "public key:         {}", view.public_key)?;
    Ok(out)
}

/// Render registry entries as a table
pub fn render_versions(versions: &[VersionView], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(versions)?);
    }

    let mut out = String::new();
    for view in versions {
        let version = &view.version;
        let encodings: Vec<&str> = version.addr_encodings.iter().map(|e| e.as_str()).collect();
        writeln!(
            out,
            "{:<20} {:#010x} {}  {:#010x} {}  {:<14} {}",
            version.coin,
            version.private_flag,
            version.private_prefix,
            version.public_flag,
            version.public_prefix,
            version.path,
            encodings.join(", ")
        )?;
    }
    Ok(out)
}
