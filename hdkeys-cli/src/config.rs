//! CLI configuration from the environment

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

/// Path used by `derive` when none is given
pub const DEFAULT_PATH: &str = "m/44'/0'/0'/0/0";

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Settings that command line flags may override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub default_path: String,
    pub output: OutputFormat,
    pub log_filter: String,
}

impl CliConfig {
    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            default_path: lookup("HDKEYS_DEFAULT_PATH").unwrap_or_else(|| DEFAULT_PATH.to_string()),
            output: lookup("HDKEYS_OUTPUT")
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| "warn".to_string()),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}
