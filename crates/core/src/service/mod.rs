//! Public cache service.
//!
//! [`CacheService`] owns its configuration and observers and composes the
//! store and fetch engine per call. Its async methods are the one canonical
//! implementation of each operation; [`blocking::CacheService`] exposes the
//! same operations to synchronous callers.
//!
//! Batch operations are fail-fast: `store`, `remove` and `flush` stop at the
//! first error and return no partial results. `fetch` is the exception only
//! for retrieval failures, which it reports per URL as
//! [`FetchOutcome::Failed`].

pub mod blocking;
pub mod events;

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::cache::{CacheRecord, CacheStore, CachedImage, FetchOutcome};
use crate::config::{CacheConfig, ConfigError, ConfigPatch};
use crate::fetch::{FetchEngine, Retriever};
use crate::Error;

pub use events::{CacheEvent, EventHandler, EventPayload, Hooks};

/// One URL or a collection of URLs.
///
/// Operations accept either shape; `fetch` answers in the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Urls {
    One(String),
    Many(Vec<String>),
}

impl Urls {
    /// Validate and flatten. Returns whether the input was a single URL.
    fn into_checked(self) -> Result<(bool, Vec<String>), Error> {
        let (single, urls) = match self {
            Urls::One(url) => (true, vec![url]),
            Urls::Many(urls) => (false, urls),
        };

        if urls.is_empty() {
            return Err(Error::InvalidArgument("at least one url is required".into()));
        }
        if let Some(position) = urls.iter().position(|url| url.trim().is_empty()) {
            return Err(Error::InvalidArgument(format!("url at position {position} is empty")));
        }

        Ok((single, urls))
    }
}

impl From<&str> for Urls {
    fn from(url: &str) -> Self {
        Urls::One(url.to_string())
    }
}

impl From<String> for Urls {
    fn from(url: String) -> Self {
        Urls::One(url)
    }
}

impl From<&String> for Urls {
    fn from(url: &String) -> Self {
        Urls::One(url.clone())
    }
}

impl From<Vec<String>> for Urls {
    fn from(urls: Vec<String>) -> Self {
        Urls::Many(urls)
    }
}

impl From<Vec<&str>> for Urls {
    fn from(urls: Vec<&str>) -> Self {
        Urls::Many(urls.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for Urls {
    fn from(urls: &[String]) -> Self {
        Urls::Many(urls.to_vec())
    }
}

impl From<&[&str]> for Urls {
    fn from(urls: &[&str]) -> Self {
        Urls::Many(urls.iter().map(|url| url.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Urls {
    fn from(urls: [&str; N]) -> Self {
        Urls::Many(urls.iter().map(|url| url.to_string()).collect())
    }
}

/// Results shaped like the input: one item for a single URL, a list otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Batch<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Batch<T> {
    fn shaped(single: bool, mut items: Vec<T>) -> Self {
        match (single, items.len()) {
            (true, 1) => Batch::One(items.remove(0)),
            _ => Batch::Many(items),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Batch::One(item) => vec![item],
            Batch::Many(items) => items,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Batch::One(item) => std::slice::from_ref(item),
            Batch::Many(items) => items,
        }
    }

    /// The single result, if the input was a single URL.
    pub fn into_one(self) -> Option<T> {
        match self {
            Batch::One(item) => Some(item),
            Batch::Many(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Summary of a flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlushReport {
    /// Cache files deleted.
    pub deleted: usize,
    /// Entries found in the directory, including non-cache files.
    pub total_files: usize,
    pub dir: PathBuf,
}

/// Disk-backed image cache.
pub struct CacheService {
    retriever: Arc<dyn Retriever>,
    config: RwLock<CacheConfig>,
    hooks: Hooks,
}

impl CacheService {
    /// Create a service. `config` is used as given; call
    /// [`CacheConfig::validate`] first if it came from user input.
    pub fn new(retriever: Arc<dyn Retriever>, config: CacheConfig) -> Self {
        tracing::info!(dir = %config.dir.display(), compressed = config.compressed, "cache service ready");
        Self { retriever, config: RwLock::new(config), hooks: Hooks::default() }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> CacheConfig {
        self.config.read().clone()
    }

    /// Merge `patch` into the configuration. Takes effect on the next call.
    ///
    /// Existing cache files are not renamed; changing `compressed` or
    /// `extname` leaves files written under the old values unreachable.
    pub fn update_config(&self, patch: ConfigPatch) -> Result<CacheConfig, ConfigError> {
        let mut updated = self.config();
        updated.apply(patch);
        updated.validate()?;

        *self.config.write() = updated.clone();
        tracing::debug!(?updated, "configuration updated");
        Ok(updated)
    }

    /// Register an observer for `event`.
    pub fn on<F>(&self, event: CacheEvent, handler: F)
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.hooks.register(event, Arc::new(handler));
    }

    /// Register an observer by event name (`get`, `set`, `fetch`, `remove`, `flush`).
    pub fn on_named<F>(&self, event: &str, handler: F) -> Result<(), Error>
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.on(event.parse()?, handler);
        Ok(())
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    fn store_handle(&self) -> CacheStore {
        CacheStore::new(self.config())
    }

    fn engine(&self) -> FetchEngine {
        FetchEngine::new(self.retriever.clone(), self.config())
    }

    /// Whether `url` has a cache file. Missing is `false`, not an error.
    pub async fn is_cached(&self, url: &str) -> Result<bool, Error> {
        let (_, urls) = Urls::from(url).into_checked()?;
        self.store_handle().exists(&urls[0]).await
    }

    /// Read the cached image for `url`.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when `url` is not cached.
    pub async fn get(&self, url: &str) -> Result<CachedImage, Error> {
        let result = match Urls::from(url).into_checked() {
            Ok(_) => self.store_handle().read(url).await,
            Err(e) => Err(e),
        };
        self.hooks.emit(CacheEvent::Get, &EventPayload::from_result(Some(url), &result));
        result
    }

    /// Retrieve and write every URL, replacing cached copies.
    ///
    /// Never serves from disk. Retrieval runs concurrently; writes then go
    /// out one at a time in input order, so Set events follow that order.
    /// Fails on the first retrieval or write error.
    pub async fn store(&self, urls: impl Into<Urls>) -> Result<Vec<CacheRecord>, Error> {
        let (_, urls) = urls.into().into_checked()?;
        let engine = self.engine();

        let records = match self.retrieve_for_store(&engine, &urls).await {
            Ok(records) => records,
            Err(e) => {
                let url = match &e {
                    Error::Retrieval { url, .. } => Some(url.clone()),
                    _ => None,
                };
                self.hooks.emit(CacheEvent::Set, &EventPayload { url, error: Some(e.to_string()) });
                return Err(e);
            }
        };

        for record in &records {
            let result = engine.store().write(record).await;
            self.hooks.emit(CacheEvent::Set, &EventPayload::from_result(Some(&record.url), &result));
            result?;
        }

        tracing::info!(count = records.len(), "stored images");
        Ok(records)
    }

    async fn retrieve_for_store(&self, engine: &FetchEngine, urls: &[String]) -> Result<Vec<CacheRecord>, Error> {
        engine.store().ensure_directory().await?;
        engine.retrieve_all(urls).await
    }

    /// Serve each URL from disk or retrieve and cache it.
    ///
    /// A single URL in gives [`Batch::One`] out.
    pub async fn fetch(&self, urls: impl Into<Urls>) -> Result<Batch<FetchOutcome>, Error> {
        let (single, urls) = urls.into().into_checked()?;
        let result = self.engine().fetch_many(&urls).await;

        match &result {
            Ok(outcomes) => {
                for outcome in outcomes {
                    let payload = EventPayload {
                        url: Some(outcome.url().to_string()),
                        error: outcome
                            .failure()
                            .map(|f| f.status_message.clone().unwrap_or_else(|| "retrieval failed".into())),
                    };
                    self.hooks.emit(CacheEvent::Fetch, &payload);
                }
            }
            Err(e) => self.hooks.emit(CacheEvent::Fetch, &EventPayload { url: None, error: Some(e.to_string()) }),
        }

        result.map(|outcomes| Batch::shaped(single, outcomes))
    }

    /// Delete the cache file of every URL. Stops at the first failure.
    pub async fn remove(&self, urls: impl Into<Urls>) -> Result<Vec<String>, Error> {
        let (_, urls) = urls.into().into_checked()?;
        let store = self.store_handle();

        let mut removed = Vec::with_capacity(urls.len());
        for url in urls {
            let result = store.delete(&url).await;
            self.hooks.emit(CacheEvent::Remove, &EventPayload::from_result(Some(&url), &result));
            result?;
            removed.push(url);
        }

        tracing::debug!(count = removed.len(), "removed cache files");
        Ok(removed)
    }

    /// Delete every cache file in the cache directory.
    ///
    /// # Errors
    ///
    /// `Error::EmptyCache` when the directory holds no file with the
    /// configured extension.
    pub async fn flush(&self) -> Result<FlushReport, Error> {
        let result = self.flush_files().await;
        self.hooks.emit(CacheEvent::Flush, &EventPayload::from_result(None, &result));
        result
    }

    async fn flush_files(&self) -> Result<FlushReport, Error> {
        let store = self.store_handle();
        let dir = store.config().dir.clone();
        let listed = store.list_cache_files().await?;

        if listed.files.is_empty() {
            return Err(Error::EmptyCache(dir));
        }

        let mut deleted = 0;
        for path in &listed.files {
            store.remove_file(path).await?;
            deleted += 1;
        }

        tracing::info!(deleted, dir = %dir.display(), "flushed cache");
        Ok(FlushReport { deleted, total_files: listed.total_entries, dir })
    }
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("config", &*self.config.read())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
