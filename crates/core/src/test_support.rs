//! In-memory retriever used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::fetch::{RetrievalFailure, Retriever};

/// Answers every URL with a deterministic data URI unless told otherwise.
#[derive(Default)]
pub struct StubRetriever {
    failures: HashMap<String, RetrievalFailure>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl StubRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, url: &str, status: u16, reason: &str) -> Self {
        self.failures.insert(url.to_string(), RetrievalFailure::status(status, reason));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn payload_for(url: &str) -> String {
        format!("data:image/png;base64,{}", crate::cache::compute_cache_key(url))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl Retriever for StubRetriever {
    async fn retrieve(&self, url: &str, _timeout: Duration) -> Result<String, RetrievalFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.failures.get(url) {
            Some(failure) => Err(failure.clone()),
            None => Ok(Self::payload_for(url)),
        }
    }
}
