//! Core types and shared functionality for imgcache.
//!
//! This crate provides:
//! - A file-per-URL image cache with optional zlib compression
//! - Fetch-or-load orchestration over a pluggable [`fetch::Retriever`]
//! - The [`CacheService`] API (async, plus a blocking facade)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod service;

#[cfg(test)]
mod test_support;

pub use cache::{CacheRecord, CacheStatus, CachedImage, FetchFailure, FetchOutcome};
pub use config::{CacheConfig, ConfigError, ConfigPatch};
pub use error::Error;
pub use fetch::{RetrievalFailure, Retriever};
pub use service::{Batch, CacheEvent, CacheService, EventPayload, FlushReport, Urls};
