//! imgcache command-line entry point.
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imgcache_client::{ClientConfig, ImageClient};
use imgcache_core::service::blocking::CacheService;
use imgcache_core::{CacheConfig, ConfigPatch};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "imgcache")]
#[command(author, version, about = "Disk cache for remote images", long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that override the loaded configuration.
#[derive(Debug, Default, clap::Args)]
struct Overrides {
    /// Cache directory
    #[arg(long, global = true, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Read and write zlib-compressed cache files (`--compressed false` turns it off)
    #[arg(long, global = true, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    compressed: Option<bool>,

    /// Cache file extension, including the leading dot
    #[arg(long, global = true, value_name = "EXT")]
    extname: Option<String>,

    /// Retrieve through the Google image proxy (`--google-cache false` turns it off)
    #[arg(long, global = true, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    google_cache: Option<bool>,

    /// Proxy resize width in pixels
    #[arg(long, global = true, value_name = "PX")]
    proxy_width: Option<u32>,

    /// Per-operation timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    timeout_ms: Option<u64>,
}

impl Overrides {
    fn into_patch(self) -> ConfigPatch {
        ConfigPatch {
            dir: self.dir,
            compressed: self.compressed,
            extname: self.extname,
            google_cache: self.google_cache,
            proxy_width: self.proxy_width.map(Some),
            timeout_ms: self.timeout_ms,
            ..Default::default()
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Exit 0 if the URL is cached, 1 otherwise
    IsCached { url: String },

    /// Print a cached image record
    Get { url: String },

    /// Serve from cache or download, for each URL
    Fetch {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Download and overwrite cache files for each URL
    Store {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Delete the cache files of each URL
    Remove {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Delete every cache file in the cache directory
    Flush,

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.overrides)?;

    if let Commands::Config = cli.command {
        return print_json(&config);
    }

    let client = ImageClient::new(ClientConfig {
        user_agent: format!("imgcache/{}", env!("CARGO_PKG_VERSION")),
        ..Default::default()
    })?;
    let service = CacheService::new(Arc::new(client), config)?;

    run(&service, cli.command)
}

fn resolve_config(overrides: Overrides) -> Result<CacheConfig> {
    let mut config = CacheConfig::load().context("failed to load configuration")?;
    config.apply(overrides.into_patch());
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run(service: &CacheService, command: Commands) -> Result<()> {
    match command {
        Commands::IsCached { url } => {
            let cached = service.is_cached(&url)?;
            println!("{cached}");
            if !cached {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Get { url } => print_json(&service.get(&url)?),
        Commands::Fetch { urls } => {
            let outcomes = service.fetch(urls)?.into_vec();
            for failure in outcomes.iter().filter_map(|o| o.failure()) {
                tracing::warn!(url = %failure.url, status = ?failure.status_code, "could not retrieve image");
            }
            print_json(&outcomes)
        }
        Commands::Store { urls } => {
            let stored: Vec<_> = service.store(urls)?.into_iter().map(|record| record.url).collect();
            print_json(&stored)
        }
        Commands::Remove { urls } => print_json(&service.remove(urls)?),
        Commands::Flush => print_json(&service.flush()?),
        Commands::Config => print_json(&service.config()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
