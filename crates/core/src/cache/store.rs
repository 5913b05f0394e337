//! Disk operations on the cache directory.
//!
//! A [`CacheStore`] works against a configuration snapshot, so one operation
//! sees one consistent directory, extension and compression setting even if
//! the owning service is reconfigured concurrently. Every filesystem call is
//! bounded by the configured timeout.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

use super::codec;
use super::path::{resolve, resolve_key};
use super::record::{CacheRecord, CachedImage};
use crate::{CacheConfig, Error};

/// Cache files found in the cache directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListedFiles {
    /// Files whose extension matches the configured `extname`.
    pub files: Vec<PathBuf>,
    /// Number of entries in the directory, matching or not.
    pub total_entries: usize,
}

/// Low-level disk access for one configuration.
#[derive(Debug, Clone)]
pub struct CacheStore {
    config: CacheConfig,
}

impl CacheStore {
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Path of the cache file for `url`.
    pub fn path_for(&self, url: &str) -> PathBuf {
        resolve(url, &self.config)
    }

    /// Whether a cache file exists for `url`.
    ///
    /// Only "not found" maps to `false`; any other failure is an error.
    pub async fn exists(&self, url: &str) -> Result<bool, Error> {
        let path = self.path_for(url);
        match self.bounded(&path, fs::metadata(&path)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::store(path, e)),
        }
    }

    /// Create the cache directory if it does not exist yet.
    pub async fn ensure_directory(&self) -> Result<(), Error> {
        let dir = &self.config.dir;
        self.bounded(dir, fs::create_dir_all(dir))
            .await
            .map_err(|e| Error::store(dir, e))
    }

    /// Read and decode the cache file for `url`.
    pub async fn read(&self, url: &str) -> Result<CachedImage, Error> {
        let path = self.path_for(url);
        let bytes = match self.bounded(&path, fs::read(&path)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::NotFound(url.to_string())),
            Err(e) => return Err(Error::store(path, e)),
        };

        let record = codec::decode(&bytes, &self.config)?;
        tracing::debug!(url, path = %path.display(), bytes = bytes.len(), "read cache file");

        Ok(CachedImage::hit(record, bytes.len() as u64))
    }

    /// Encode and write `record`, replacing any existing file.
    ///
    /// Returns the path written.
    pub async fn write(&self, record: &CacheRecord) -> Result<PathBuf, Error> {
        self.ensure_directory().await?;

        let path = resolve_key(&record.hash_key, &self.config);
        let bytes = codec::encode(record, &self.config).map_err(|e| Error::store(&path, e))?;
        self.bounded(&path, fs::write(&path, &bytes))
            .await
            .map_err(|e| Error::store(&path, e))?;

        tracing::debug!(url = %record.url, path = %path.display(), bytes = bytes.len(), "wrote cache file");
        Ok(path)
    }

    /// Delete the cache file for `url`.
    pub async fn delete(&self, url: &str) -> Result<(), Error> {
        let path = self.path_for(url);
        self.remove_file(&path).await.map_err(|e| match e {
            Error::Store { source, .. } if source.kind() == io::ErrorKind::NotFound => Error::NotFound(url.to_string()),
            other => other,
        })
    }

    /// Delete a file in the cache directory by path.
    pub async fn remove_file(&self, path: &Path) -> Result<(), Error> {
        self.bounded(path, fs::remove_file(path))
            .await
            .map_err(|e| Error::store(path, e))
    }

    /// List cache files in the configured directory.
    pub async fn list_cache_files(&self) -> Result<ListedFiles, Error> {
        let dir = &self.config.dir;
        let wanted = self.config.extname.trim_start_matches('.');

        let listing = async {
            let mut entries = fs::read_dir(dir).await?;
            let mut listed = ListedFiles::default();
            while let Some(entry) = entries.next_entry().await? {
                listed.total_entries += 1;
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == wanted) && entry.file_type().await?.is_file() {
                    listed.files.push(path);
                }
            }
            Ok::<_, io::Error>(listed)
        };

        let mut listed = self.bounded(dir, listing).await.map_err(|e| Error::store(dir, e))?;
        listed.files.sort();
        Ok(listed)
    }

    async fn bounded<T>(&self, path: &Path, op: impl Future<Output = io::Result<T>>) -> io::Result<T> {
        match tokio::time::timeout(self.config.timeout(), op).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("{} timed out after {}ms", path.display(), self.config.timeout_ms),
            )),
        }
    }
}
