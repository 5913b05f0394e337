//! Cache configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (IMGCACHE_*)
//! 2. TOML config file (if IMGCACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! A loaded [`CacheConfig`] is owned by one cache service instance. Later
//! changes go through [`ConfigPatch`], which merges into the current value.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Cache configuration.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (IMGCACHE_*)
/// 2. TOML config file (if IMGCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one file per cached URL.
    ///
    /// Set via IMGCACHE_DIR environment variable.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Whether new cache files are zlib-compressed.
    ///
    /// Files are named with a `_min` suffix when set, so toggling this
    /// leaves files written under the other setting unreachable.
    #[serde(default)]
    pub compressed: bool,

    /// Extension of cache files, including the leading dot.
    #[serde(default = "default_extname")]
    pub extname: String,

    /// Route retrieval through the public Google image proxy.
    #[serde(default)]
    pub google_cache: bool,

    /// Optional `resize_w` parameter passed to the image proxy.
    #[serde(default)]
    pub proxy_width: Option<u32>,

    /// Optional `refresh` parameter (seconds) passed to the image proxy.
    #[serde(default)]
    pub proxy_refresh: Option<u64>,

    /// Timeout for every retrieval and disk operation, in milliseconds.
    ///
    /// Set via IMGCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_dir() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_extname() -> String {
    ".cache".into()
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            compressed: false,
            extname: default_extname(),
            google_cache: false,
            proxy_width: None,
            proxy_refresh: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl CacheConfig {
    /// Default configuration rooted at `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), ..Default::default() }
    }

    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("IMGCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("IMGCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Merge `patch` into this configuration. Unset fields are left alone.
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(dir) = patch.dir {
            self.dir = dir;
        }
        if let Some(compressed) = patch.compressed {
            self.compressed = compressed;
        }
        if let Some(extname) = patch.extname {
            self.extname = extname;
        }
        if let Some(google_cache) = patch.google_cache {
            self.google_cache = google_cache;
        }
        if let Some(width) = patch.proxy_width {
            self.proxy_width = width;
        }
        if let Some(refresh) = patch.proxy_refresh {
            self.proxy_refresh = refresh;
        }
        if let Some(timeout_ms) = patch.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
    }
}

/// Partial configuration update.
///
/// `proxy_width` and `proxy_refresh` are doubly optional so a patch can
/// clear them (`Some(None)`) as well as leave them alone (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    pub dir: Option<PathBuf>,
    pub compressed: Option<bool>,
    pub extname: Option<String>,
    pub google_cache: Option<bool>,
    pub proxy_width: Option<Option<u32>>,
    pub proxy_refresh: Option<Option<u64>>,
    pub timeout_ms: Option<u64>,
}
