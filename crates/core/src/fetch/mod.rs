//! Fetch-or-load orchestration.
//!
//! The engine consults the store first and falls back to a [`Retriever`]
//! on a miss. The retriever is the only network-facing seam; the HTTP
//! implementation lives in `imgcache-client`, tests plug in stubs.

pub mod engine;
pub mod proxy;

use std::time::Duration;

use async_trait::async_trait;

use crate::Error;
use crate::cache::FetchFailure;

pub use engine::FetchEngine;
pub use proxy::{GOOGLE_PROXY_ENDPOINT, proxy_url};

/// Resolves an image URL to a base64 data URI.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve `url`, giving up after `timeout`.
    async fn retrieve(&self, url: &str, timeout: Duration) -> Result<String, RetrievalFailure>;
}

/// Why a retrieval produced no payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct RetrievalFailure {
    /// HTTP status, when the server answered.
    pub status_code: Option<u16>,
    pub reason: String,
}

impl RetrievalFailure {
    /// The server answered with a non-success status.
    pub fn status(status_code: u16, reason: impl Into<String>) -> Self {
        Self { status_code: Some(status_code), reason: reason.into() }
    }

    /// No usable response (connection error, timeout, oversized body...).
    pub fn transport(reason: impl Into<String>) -> Self {
        Self { status_code: None, reason: reason.into() }
    }

    pub(crate) fn into_failure(self, url: &str) -> FetchFailure {
        FetchFailure { url: url.to_string(), status_code: self.status_code, status_message: Some(self.reason) }
    }
}

impl From<FetchFailure> for Error {
    fn from(failure: FetchFailure) -> Self {
        Error::Retrieval {
            reason: failure.status_message.unwrap_or_else(|| "retrieval failed".to_string()),
            url: failure.url,
            status_code: failure.status_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_into_error() {
        let failure = RetrievalFailure::status(404, "Not Found").into_failure("https://example.com/x.png");
        let err: Error = failure.into();
        assert!(matches!(err, Error::Retrieval { status_code: Some(404), .. }));
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn test_transport_failure_has_no_status() {
        let failure = RetrievalFailure::transport("connection refused");
        assert!(failure.status_code.is_none());
        assert_eq!(failure.to_string(), "connection refused");
    }
}
