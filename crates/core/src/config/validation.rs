//! Configuration validation rules.
//!
//! This module provides validation logic for `CacheConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::CacheConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl CacheConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `dir` is empty, and
    /// `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `extname` is empty, lacks a leading dot, or contains a path separator
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dir.as_os_str().is_empty() {
            return Err(ConfigError::Missing {
                field: "dir".into(),
                hint: "Set IMGCACHE_DIR environment variable".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.extname.len() < 2 || !self.extname.starts_with('.') {
            return Err(ConfigError::Invalid {
                field: "extname".into(),
                reason: "must be a dot followed by at least one character".into(),
            });
        }
        if self.extname.contains(['/', '\\']) || self.extname[1..].contains('.') {
            return Err(ConfigError::Invalid {
                field: "extname".into(),
                reason: "must be a single extension without separators".into(),
            });
        }

        if !self.google_cache && (self.proxy_width.is_some() || self.proxy_refresh.is_some()) {
            tracing::warn!(
                proxy_width = ?self.proxy_width,
                proxy_refresh = ?self.proxy_refresh,
                "proxy parameters are set but google_cache is disabled; they will be ignored"
            );
        }

        Ok(())
    }
}
