//! Command-line and environment configuration.
//!
//! Every serve option can also be supplied through a `CALLEJERO_*`
//! environment variable; flags win over the environment.

use crate::resolver::normalizer::{DEFAULT_STREET_TYPES, QueryNormalizer};

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_REGION: &str = "Vélez-Málaga, España";

/// Municipal street directory and address resolver
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON snapshot backing the directory (required by `import` and `sections`;
    /// `serve` runs memory-only without it)
    #[arg(
        long,
        global = true,
        env = "CALLEJERO_DATA",
        value_hint = clap::ValueHint::FilePath
    )]
    pub data: Option<PathBuf>,

    #[command(flatten)]
    pub serve: ServeArgs,

    /// subcommands (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the HTTP API
    Serve,

    /// Load entries from a census SQL dump into the snapshot
    Import {
        #[arg(value_hint = clap::ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Print the entry count of every section
    Sections,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address the HTTP server listens on
    #[arg(
        long,
        global = true,
        env = "CALLEJERO_BIND",
        default_value = "127.0.0.1:3000"
    )]
    pub bind: SocketAddr,

    /// Base URL of the Nominatim-compatible geocoding service
    #[arg(
        long,
        global = true,
        env = "CALLEJERO_GEOCODER_URL",
        default_value = DEFAULT_GEOCODER_URL
    )]
    pub geocoder_url: String,

    /// Municipality and region appended to every geocoded address
    #[arg(long, global = true, env = "CALLEJERO_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Recognised street-type prefixes, comma separated, in precedence order
    #[arg(long, global = true, env = "CALLEJERO_STREET_TYPES", value_delimiter = ',')]
    pub street_types: Vec<String>,

    /// User-Agent sent to the geocoding service
    #[arg(long, global = true, env = "CALLEJERO_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Per-lookup timeout for the geocoding service, in seconds
    #[arg(
        long,
        global = true,
        env = "CALLEJERO_GEOCODER_TIMEOUT",
        default_value_t = 10
    )]
    pub geocoder_timeout_secs: u64,
}

impl Cli {
    /// The requested subcommand; `serve` when none was given.
    pub fn selected(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }

    /// Snapshot the command works on. Only `serve` may run memory-only;
    /// `import` and `sections` would act on a throwaway store.
    pub fn snapshot_for(&self, command: &Commands) -> Result<Option<&Path>> {
        match (command, self.data.as_deref()) {
            (Commands::Serve, data) => Ok(data),
            (_, Some(path)) => Ok(Some(path)),
            (Commands::Import { .. }, None) => {
                bail!("`import` needs --data (or CALLEJERO_DATA) to persist the rows")
            }
            (Commands::Sections, None) => {
                bail!("`sections` needs --data (or CALLEJERO_DATA) to read the directory")
            }
        }
    }
}

impl ServeArgs {
    pub fn normalizer(&self) -> QueryNormalizer {
        if self.street_types.iter().all(|t| t.trim().is_empty()) {
            QueryNormalizer::new(DEFAULT_STREET_TYPES)
        } else {
            QueryNormalizer::new(&self.street_types)
        }
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("callejero/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoder_timeout_secs)
    }
}
