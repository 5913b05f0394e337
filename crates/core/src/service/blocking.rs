//! Synchronous facade over [`super::CacheService`].
//!
//! Owns a current-thread runtime and drives the async operations to
//! completion. Must not be called from inside another tokio runtime.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};

use super::{Batch, CacheEvent, EventPayload, FlushReport, Urls};
use crate::cache::{CacheRecord, CachedImage, FetchOutcome};
use crate::config::{CacheConfig, ConfigError, ConfigPatch};
use crate::fetch::Retriever;
use crate::Error;

/// Blocking image cache.
#[derive(Debug)]
pub struct CacheService {
    inner: super::CacheService,
    runtime: Runtime,
}

impl CacheService {
    pub fn new(retriever: Arc<dyn Retriever>, config: CacheConfig) -> Result<Self, Error> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Task(format!("failed to start runtime: {e}")))?;

        Ok(Self { inner: super::CacheService::new(retriever, config), runtime })
    }

    /// The async service this facade drives.
    pub fn as_async(&self) -> &super::CacheService {
        &self.inner
    }

    pub fn config(&self) -> CacheConfig {
        self.inner.config()
    }

    pub fn update_config(&self, patch: ConfigPatch) -> Result<CacheConfig, ConfigError> {
        self.inner.update_config(patch)
    }

    pub fn on<F>(&self, event: CacheEvent, handler: F)
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.inner.on(event, handler);
    }

    pub fn on_named<F>(&self, event: &str, handler: F) -> Result<(), Error>
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.inner.on_named(event, handler)
    }

    pub fn is_cached(&self, url: &str) -> Result<bool, Error> {
        self.runtime.block_on(self.inner.is_cached(url))
    }

    pub fn get(&self, url: &str) -> Result<CachedImage, Error> {
        self.runtime.block_on(self.inner.get(url))
    }

    pub fn store(&self, urls: impl Into<Urls>) -> Result<Vec<CacheRecord>, Error> {
        self.runtime.block_on(self.inner.store(urls))
    }

    pub fn fetch(&self, urls: impl Into<Urls>) -> Result<Batch<FetchOutcome>, Error> {
        self.runtime.block_on(self.inner.fetch(urls))
    }

    pub fn remove(&self, urls: impl Into<Urls>) -> Result<Vec<String>, Error> {
        self.runtime.block_on(self.inner.remove(urls))
    }

    pub fn flush(&self) -> Result<FlushReport, Error> {
        self.runtime.block_on(self.inner.flush())
    }
}
