//! Cache record types.
//!
//! [`CacheRecord`] is the persisted unit. [`CachedImage`] is what reads and
//! fetches hand back: the record plus transient fields computed at read
//! time, which never reach the disk.

use serde::{Deserialize, Serialize};

use super::hash::compute_cache_key;

/// A cached image as persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    /// Original source URL (never the proxied one).
    pub url: String,
    /// SHA-256 hex digest of `url`; the filename stem.
    pub hash_key: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Whether the file was written compressed.
    pub compressed: bool,
    /// Payload, a base64 data URI.
    pub data: String,
}

impl CacheRecord {
    /// Build a fresh record for `url` stamped with the current time.
    pub fn new(url: impl Into<String>, data: impl Into<String>, compressed: bool) -> Self {
        let url = url.into();
        Self {
            hash_key: compute_cache_key(&url),
            url,
            timestamp: chrono::Utc::now().timestamp_millis(),
            compressed,
            data: data.into(),
        }
    }
}

/// Whether a response was served from disk or freshly retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheStatus::Hit => f.write_str("HIT"),
            CacheStatus::Miss => f.write_str("MISS"),
        }
    }
}

/// A record returned from a read or fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CachedImage {
    #[serde(flatten)]
    pub record: CacheRecord,
    pub cache: CacheStatus,
    /// Human readable size of the file read from disk. Only set on reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CachedImage {
    pub fn hit(record: CacheRecord, size_bytes: u64) -> Self {
        Self { record, cache: CacheStatus::Hit, size: Some(human_size(size_bytes)) }
    }

    pub fn miss(record: CacheRecord) -> Self {
        Self { record, cache: CacheStatus::Miss, size: None }
    }
}

/// A retrieval that did not produce an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchFailure {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

/// Result of fetching one URL: an image (HIT or MISS) or a failure value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(untagged)]
pub enum FetchOutcome {
    Image(CachedImage),
    Failed(FetchFailure),
}

impl FetchOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    pub fn url(&self) -> &str {
        match self {
            FetchOutcome::Image(image) => &image.record.url,
            FetchOutcome::Failed(failure) => &failure.url,
        }
    }

    pub fn image(&self) -> Option<&CachedImage> {
        match self {
            FetchOutcome::Image(image) => Some(image),
            FetchOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchOutcome::Image(_) => None,
            FetchOutcome::Failed(failure) => Some(failure),
        }
    }
}

const SIZE_UNITS: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count with SI units, e.g. `999 B`, `12.3 kB`.
pub fn human_size(bytes: u64) -> String {
    if bytes < 1000 {
        return format!("{bytes} B");
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    size /= 1000.0;
    while size >= 1000.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }

    format!("{size:.1} {}", SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_derives_hash_key() {
        let record = CacheRecord::new("https://example.com/a.png", "data:image/png;base64,AA==", false);
        assert_eq!(record.hash_key, compute_cache_key("https://example.com/a.png"));
        assert!(record.timestamp > 0);
        assert!(!record.compressed);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = CacheRecord::new("https://example.com/a.png", "data:,", true);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("hashKey").is_some());
        assert!(json.get("hash_key").is_none());
        assert!(json.get("cache").is_none());
        assert!(json.get("size").is_none());
    }

    #[test]
    fn test_cached_image_flattens_record() {
        let record = CacheRecord::new("https://example.com/a.png", "data:,", false);
        let json = serde_json::to_value(CachedImage::hit(record, 12_345)).unwrap();
        assert_eq!(json["cache"], "HIT");
        assert_eq!(json["size"], "12.3 kB");
        assert_eq!(json["url"], "https://example.com/a.png");
    }

    #[test]
    fn test_miss_has_no_size() {
        let record = CacheRecord::new("https://example.com/a.png", "data:,", false);
        let json = serde_json::to_value(CachedImage::miss(record)).unwrap();
        assert_eq!(json["cache"], "MISS");
        assert!(json.get("size").is_none());
    }

    #[test]
    fn test_failure_outcome() {
        let outcome = FetchOutcome::Failed(FetchFailure {
            url: "https://example.com/missing.png".into(),
            status_code: Some(404),
            status_message: Some("Not Found".into()),
        });
        assert!(outcome.is_error());
        assert!(outcome.image().is_none());
        assert_eq!(outcome.failure().unwrap().status_code, Some(404));
        assert_eq!(outcome.url(), "https://example.com/missing.png");

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["statusCode"], 404);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(999), "999 B");
        assert_eq!(human_size(1000), "1.0 kB");
        assert_eq!(human_size(12_345), "12.3 kB");
        assert_eq!(human_size(1_500_000), "1.5 MB");
        assert_eq!(human_size(2_000_000_000), "2.0 GB");
    }
}
