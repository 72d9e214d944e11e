//! hdkeys command-line interface
//!
//! Non-interactive front end over the hdkeys library: create master keys,
//! derive key paths, neuter and inspect extended keys and list the version
//! bytes registry.

mod config;
mod output;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hdkeys::bip32::neuter;
use hdkeys::{ExtendedKey, Generator, Path, Registry, VersionBytes};

use config::{CliConfig, OutputFormat};
use output::{render_inspection, render_keys, render_versions, KeyView, VersionView};

#[derive(Parser)]
#[command(name = "hdkeys")]
#[command(about = "BIP32 hierarchical deterministic key tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format, overrides HDKEYS_OUTPUT
    #[arg(short, long, global = true, value_enum)]
    output: Option<OutputFormat>,

    /// Enable debug logging for the library
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a master key from a hex seed
    Master {
        /// Hex encoded seed, at least 16 bytes
        #[arg(long)]
        seed: String,
        /// Private key prefix selecting the version bytes
        #[arg(long, default_value = "xprv")]
        prefix: String,
    },
    /// Derive every key along a path from a hex seed
    Derive {
        #[arg(long)]
        seed: String,
        /// Derivation path, defaults to HDKEYS_DEFAULT_PATH
        #[arg(long)]
        path: Option<String>,
        #[arg(long, default_value = "xprv")]
        prefix: String,
        /// Print public keys instead of private ones
        #[arg(long)]
        public: bool,
    },
    /// Convert an extended private key into its public counterpart
    Neuter { key: String },
    /// Decode an extended key and print its fields
    Inspect { key: String },
    /// List registered version bytes
    Versions {
        /// Filter by purpose, e.g. 84
        #[arg(long)]
        purpose: Option<u32>,
        /// Filter by SLIP-44 coin type, e.g. 2
        #[arg(long)]
        coin: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::default();

    let filter = if cli.verbose {
        "hdkeys=debug,hdkeys_cli=debug".to_string()
    } else {
        config.log_filter.clone()
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = cli.output.unwrap_or(config.output);
    debug!(%format, "starting hdkeys {}", hdkeys::VERSION);

    let rendered = match cli.command {
        Commands::Master { seed, prefix } => {
            let version = version_for_prefix(&prefix)?;
            let generator = Generator::from_seed_hex_with_version(&seed, version)?;
            let view = KeyView::new(Some("m".to_string()), generator.root_key())?;
            render_keys(&[view], format)?
        }
        Commands::Derive {
            seed,
            path,
            prefix,
            public,
        } => {
            let path = path.unwrap_or_else(|| config.default_path.clone());
            let path = Path::parse(&path).with_context(|| format!("invalid path {}", path))?;
            let version = version_for_prefix(&prefix)?;
            let generator = Generator::from_seed_hex_with_version(&seed, version)?;

            let views = generator
                .derive(&path)?
                .into_iter()
                .map(|step| {
                    let key = if public { neuter(&step.key)? } else { step.key };
                    KeyView::new(Some(step.path.to_string()), &key)
                })
                .collect::<Result<Vec<_>>>()?;
            info!(path = %path, keys = views.len(), "derived keys");
            render_keys(&views, format)?
        }
        Commands::Neuter { key } => {
            let key = parse_key(&key)?;
            render_keys(&[KeyView::new(None, &neuter(&key)?)?], format)?
        }
        Commands::Inspect { key } => {
            let key = parse_key(&key)?;
            render_inspection(&KeyView::new(None, &key)?, format)?
        }
        Commands::Versions { purpose, coin } => {
            let views: Vec<VersionView> = select_versions(purpose, coin)
                .into_iter()
                .map(VersionView::from)
                .collect();
            render_versions(&views, format)?
        }
    };

    print!("{}", rendered);
    Ok(())
}

fn parse_key(encoded: &str) -> Result<ExtendedKey> {
    encoded
        .parse()
        .with_context(|| "could not decode extended key".to_string())
}

/// First registry entry whose private prefix matches, e.g. `zprv`
fn version_for_prefix(prefix: &str) -> Result<&'static VersionBytes> {
    Registry::global()
        .entries()
        .iter()
        .find(|version| version.private_prefix == prefix)
        .ok_or_else(|| anyhow!("no registered version bytes with prefix {}", prefix))
}

fn select_versions(purpose: Option<u32>, coin: Option<u32>) -> Vec<&'static VersionBytes> {
    Registry::global()
        .entries()
        .iter()
        .filter(|version| purpose.map_or(true, |p| version.purpose_value().ok() == Some(p)))
        .filter(|version| coin.map_or(true, |c| version.coin_value().ok() == Some(c)))
        .collect()
}
