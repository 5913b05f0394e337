//! File-backed image cache.
//!
//! One file per cached URL, named by the SHA-256 of the URL:
//!
//! - `hash`: cache key derivation
//! - `path`: file naming (`<dir>/<key>[_min]<extname>`)
//! - `codec`: JSON encoding with an optional zlib envelope
//! - `store`: async disk operations against a configuration snapshot

pub mod codec;
pub mod hash;
pub mod path;
pub mod record;
pub mod store;

pub use crate::Error;

pub use hash::compute_cache_key;
pub use record::{CacheRecord, CacheStatus, CachedImage, FetchFailure, FetchOutcome, human_size};
pub use store::{CacheStore, ListedFiles};
