//! HIT/MISS state machine over the store and a retriever.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;

use super::{Retriever, RetrievalFailure, proxy_url};
use crate::cache::{CacheRecord, CacheStore, CachedImage, FetchFailure, FetchOutcome};
use crate::{CacheConfig, Error};

/// Fetch-or-load engine bound to one configuration snapshot.
#[derive(Clone)]
pub struct FetchEngine {
    retriever: Arc<dyn Retriever>,
    store: CacheStore,
}

impl FetchEngine {
    pub fn new(retriever: Arc<dyn Retriever>, config: CacheConfig) -> Self {
        Self { retriever, store: CacheStore::new(config) }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    fn config(&self) -> &CacheConfig {
        self.store.config()
    }

    /// Serve `url` from disk, or retrieve and persist it.
    ///
    /// A failed retrieval is returned as [`FetchOutcome::Failed`] and leaves
    /// nothing on disk. Store and decode errors are returned as `Err`.
    ///
    /// The lookup is a single read, so a file deleted concurrently is a miss.
    pub async fn fetch_one(&self, url: &str) -> Result<FetchOutcome, Error> {
        match self.store.read(url).await {
            Ok(image) => {
                tracing::debug!(url, "cache hit");
                return Ok(FetchOutcome::Image(image));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        match self.retrieve(url).await {
            Ok(record) => {
                self.store.write(&record).await?;
                tracing::debug!(url, "cache miss, stored");
                Ok(FetchOutcome::Image(CachedImage::miss(record)))
            }
            Err(failure) => {
                tracing::warn!(
                    url,
                    status = ?failure.status_code,
                    reason = ?failure.status_message,
                    "retrieval failed"
                );
                Ok(FetchOutcome::Failed(failure))
            }
        }
    }

    /// Retrieve `url` and build a fresh record without touching the disk.
    pub async fn retrieve(&self, url: &str) -> Result<CacheRecord, FetchFailure> {
        let config = self.config();
        let target = if config.google_cache { proxy_url(url, config) } else { url.to_string() };
        let timeout = config.timeout();

        let result = match tokio::time::timeout(timeout, self.retriever.retrieve(&target, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(RetrievalFailure::transport(format!("timed out after {}ms", config.timeout_ms))),
        };

        result
            .map(|payload| CacheRecord::new(url, payload, config.compressed))
            .map_err(|failure| failure.into_failure(url))
    }

    /// Fetch every URL concurrently. Output order matches input order.
    ///
    /// Retrieval failures stay per-item values; the first store or decode
    /// error fails the whole batch.
    pub async fn fetch_many(&self, urls: &[String]) -> Result<Vec<FetchOutcome>, Error> {
        self.run_batch(urls, |engine, url| async move { engine.fetch_one(&url).await })
            .await
    }

    /// Retrieve every URL concurrently, bypassing the cache.
    ///
    /// The first retrieval failure fails the whole batch.
    pub async fn retrieve_all(&self, urls: &[String]) -> Result<Vec<CacheRecord>, Error> {
        self.run_batch(urls, |engine, url| async move { engine.retrieve(&url).await.map_err(Error::from) })
            .await
    }

    /// Run one task per URL on a `JoinSet` and reassemble results by index.
    ///
    /// The first error fails the batch, but every task already spawned is
    /// still awaited before returning, so writes in flight finish on any
    /// runtime. Their results are dropped.
    async fn run_batch<T, F, Fut>(&self, urls: &[String], task: F) -> Result<Vec<T>, Error>
    where
        T: Send + 'static,
        F: Fn(FetchEngine, String) -> Fut,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let mut join_set = JoinSet::new();
        for (index, url) in urls.iter().enumerate() {
            let item = task(self.clone(), url.clone());
            join_set.spawn(async move { (index, item.await) });
        }

        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(urls.len()).collect();
        let mut first_error = None;

        while let Some(joined) = join_set.join_next().await {
            let err = match joined {
                Ok((index, Ok(value))) => {
                    slots[index] = Some(value);
                    continue;
                }
                Ok((_, Err(e))) => e,
                Err(join_err) => Error::from(join_err),
            };
            if first_error.is_none() {
                tracing::debug!(error = %err, pending = join_set.len(), "batch failed, draining in-flight tasks");
                first_error = Some(err);
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        slots
            .into_iter()
            .map(|slot| slot.ok_or_else(|| Error::Task("batch task finished without a result".to_string())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStatus;
    use crate::test_support::StubRetriever;
    use std::time::Duration;
    use tempfile::TempDir;

    const URL: &str = "https://example.com/a.png";

    fn engine(tmp: &TempDir, stub: &Arc<StubRetriever>, config: CacheConfig) -> FetchEngine {
        let config = CacheConfig { dir: tmp.path().join("cache"), ..config };
        FetchEngine::new(stub.clone(), config)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let tmp = TempDir::new().unwrap();
        let stub = Arc::new(StubRetriever::new());
        let engine = engine(&tmp, &stub, CacheConfig::default());

        let first = engine.fetch_one(URL).await.unwrap();
        let first = first.image().unwrap().clone();
        assert_eq!(first.cache, CacheStatus::Miss);
        assert!(first.size.is_none());

        let second = engine.fetch_one(URL).await.unwrap();
        let second = second.image().unwrap();
        assert_eq!(second.cache, CacheStatus::Hit);
        assert_eq!(second.record.data, first.record.data);
        assert!(second.size.is_some());

        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_value_and_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let stub = Arc::new(StubRetriever::new().with_status(URL, 404, "Not Found"));
        let engine = engine(&tmp, &stub, CacheConfig::default());

        let outcome = engine.fetch_one(URL).await.unwrap();
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.status_code, Some(404));
        assert_eq!(failure.url, URL);
        assert!(!engine.store().exists(URL).await.unwrap());
    }

    #[tokio::test]
    async fn test_proxy_rewrites_retrieval_not_key() {
        let tmp = TempDir::new().unwrap();
        let stub = Arc::new(StubRetriever::new());
        let config = CacheConfig { google_cache: true, proxy_width: Some(64), ..Default::default() };
        let engine = engine(&tmp, &stub, config);

        let outcome = engine.fetch_one(URL).await.unwrap();
        assert_eq!(outcome.url(), URL);

        let requested = stub.requested();
        assert_eq!(requested.len(), 1);
        assert!(requested[0].starts_with(super::super::GOOGLE_PROXY_ENDPOINT));
        assert!(requested[0].contains("resize_w=64"));

        let plain = FetchEngine::new(stub.clone(), CacheConfig { google_cache: false, ..engine.config().clone() });
        assert!(plain.store().exists(URL).await.unwrap());
    }

    #[tokio::test]
    async fn test_retrieval_timeout_is_failure() {
        let tmp = TempDir::new().unwrap();
        let stub = Arc::new(StubRetriever::new().with_delay(Duration::from_millis(500)));
        let engine = engine(&tmp, &stub, CacheConfig { timeout_ms: 100, ..Default::default() });

        let outcome = engine.fetch_one(URL).await.unwrap();
        let failure = outcome.failure().unwrap();
        assert!(failure.status_code.is_none());
        assert!(failure.status_message.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_fetch_many_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let stub = Arc::new(StubRetriever::new().with_status("https://example.com/missing.png", 404, "Not Found"));
        let engine = engine(&tmp, &stub, CacheConfig::default());

        let urls: Vec<String> =
            ["https://example.com/1.png", "https://example.com/missing.png", "https://example.com/3.png"]
                .iter()
                .map(|u| u.to_string())
                .collect();

        let outcomes = engine.fetch_many(&urls).await.unwrap();
        let got: Vec<&str> = outcomes.iter().map(|o| o.url()).collect();
        assert_eq!(got, urls.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(!outcomes[0].is_error());
        assert!(outcomes[1].is_error());
        assert!(!outcomes[2].is_error());
    }

    #[tokio::test]
    async fn test_fetch_many_fails_on_corrupt_file() {
        let tmp = TempDir::new().unwrap();
        let stub = Arc::new(StubRetriever::new());
        let engine = engine(&tmp, &stub, CacheConfig::default());

        engine.store().ensure_directory().await.unwrap();
        std::fs::write(engine.store().path_for(URL), b"garbage").unwrap();

        let urls = vec![URL.to_string(), "https://example.com/b.png".to_string()];
        assert!(matches!(engine.fetch_many(&urls).await, Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn test_retrieve_all_fails_fast() {
        let tmp = TempDir::new().unwrap();
        let stub = Arc::new(StubRetriever::new().with_status("https://example.com/missing.png", 500, "Server Error"));
        let engine = engine(&tmp, &stub, CacheConfig::default());

        let urls = vec![URL.to_string(), "https://example.com/missing.png".to_string()];
        let result = engine.retrieve_all(&urls).await;
        assert!(matches!(result, Err(Error::Retrieval { status_code: Some(500), .. })));
        assert!(!engine.store().exists(URL).await.unwrap());
    }

    #[tokio::test]
    async fn test_record_uses_config_compression() {
        let tmp = TempDir::new().unwrap();
        let stub = Arc::new(StubRetriever::new());
        let engine = engine(&tmp, &stub, CacheConfig { compressed: true, ..Default::default() });

        let record = engine.retrieve(URL).await.unwrap();
        assert!(record.compressed);
        assert_eq!(record.url, URL);
        assert_eq!(record.data, StubRetriever::payload_for(URL));
    }

    #[tokio::test]
    async fn test_failed_batch_finishes_in_flight_writes() {
        let tmp = TempDir::new().unwrap();
        let stub = Arc::new(StubRetriever::new().with_delay(Duration::from_millis(200)));
        let engine = engine(&tmp, &stub, CacheConfig::default());
        let slow = "https://example.com/slow.png";

        engine.store().ensure_directory().await.unwrap();
        std::fs::write(engine.store().path_for(URL), b"garbage").unwrap();

        let urls = vec![URL.to_string(), slow.to_string()];
        assert!(matches!(engine.fetch_many(&urls).await, Err(Error::Decode(_))));
        assert!(engine.store().exists(slow).await.unwrap());
    }

    #[tokio::test]
    async fn test_file_deleted_between_fetches_is_miss() {
        let tmp = TempDir::new().unwrap();
        let stub = Arc::new(StubRetriever::new());
        let engine = engine(&tmp, &stub, CacheConfig::default());

        engine.fetch_one(URL).await.unwrap();
        std::fs::remove_file(engine.store().path_for(URL)).unwrap();

        let outcome = engine.fetch_one(URL).await.unwrap();
        assert_eq!(outcome.image().unwrap().cache, CacheStatus::Miss);
        assert_eq!(stub.calls(), 2);
    }
}
