//! HTTP retrieval of images as base64 data URIs.
//!
//! ### URL Canonicalization
//! - Trim whitespace, ensure scheme (default: `https`)
//! - Lowercase host, remove fragments
//! - Preserve query string
//!
//! ### Limits
//! - Max redirects: 5
//! - Max body bytes: 10MB (configurable)
//! - Per-request timeout supplied by the caller
//!
//! Non-success statuses come back as [`RetrievalFailure::status`] with the
//! canonical reason phrase; everything else that prevents a payload is a
//! [`RetrievalFailure::transport`].

pub mod url;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use reqwest::{Client, header};

use imgcache_core::{RetrievalFailure, Retriever};

pub use self::url::{UrlError, canonicalize};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors raised while setting up the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

/// Configuration for the image client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string (default: "imgcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 10MB)
    pub max_bytes: usize,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { user_agent: "imgcache/0.1".to_string(), max_bytes: 10 * 1024 * 1024, max_redirects: 5 }
    }
}

/// reqwest-backed [`Retriever`].
#[derive(Debug, Clone)]
pub struct ImageClient {
    http: Client,
    config: ClientConfig,
}

impl ImageClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn download(&self, url_str: &str, timeout: Duration) -> Result<(Option<String>, Bytes), RetrievalFailure> {
        let url = canonicalize(url_str).map_err(|e| RetrievalFailure::transport(e.to_string()))?;

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "image/*,*/*;q=0.8")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| describe(&e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown Status");
            return Err(RetrievalFailure::status(status.as_u16(), reason));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(too_large(len as usize, self.config.max_bytes));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let bytes = response.bytes().await.map_err(|e| describe(&e, timeout))?;
        if bytes.len() > self.config.max_bytes {
            return Err(too_large(bytes.len(), self.config.max_bytes));
        }

        Ok((content_type, bytes))
    }
}

#[async_trait]
impl Retriever for ImageClient {
    async fn retrieve(&self, url: &str, timeout: Duration) -> Result<String, RetrievalFailure> {
        let start = Instant::now();
        let (content_type, bytes) = self.download(url, timeout).await?;

        tracing::debug!(
            url,
            content_type = content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE),
            bytes = bytes.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "retrieved image"
        );

        Ok(data_uri(content_type.as_deref(), &bytes))
    }
}

/// Render `bytes` as `data:<content-type>;base64,<payload>`.
pub fn data_uri(content_type: Option<&str>, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type.unwrap_or(DEFAULT_CONTENT_TYPE), STANDARD.encode(bytes))
}

fn describe(err: &reqwest::Error, timeout: Duration) -> RetrievalFailure {
    if err.is_timeout() {
        RetrievalFailure::transport(format!("timed out after {}ms", timeout.as_millis()))
    } else if err.is_redirect() {
        RetrievalFailure::transport(format!("too many redirects: {err}"))
    } else {
        RetrievalFailure::transport(format!("network error: {err}"))
    }
}

fn too_large(len: usize, max: usize) -> RetrievalFailure {
    RetrievalFailure::transport(format!("{len} bytes exceeds {max}"))
}
