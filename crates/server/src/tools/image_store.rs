//! image_store tool implementation.
//!
//! Retrieves every URL and overwrites its cache file. Fails as a whole if
//! any URL cannot be retrieved; nothing is written in that case.

use imgcache_core::CacheService;
use imgcache_core::cache::human_size;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{ImageUrlsParams, json_result};

/// Summary of one stored image. The payload itself is not echoed back.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub url: String,
    pub hash_key: String,
    pub timestamp: i64,
    /// Length of the data URI as retrieved, e.g. "12.3 kB". Not the size of
    /// the file on disk, which `image_get` reports.
    pub payload_size: String,
}

/// Output from the image_store tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoreOutput {
    pub stored: Vec<StoredImage>,
}

/// Implementation of the image_store tool.
pub async fn store_impl(service: &CacheService, params: ImageUrlsParams) -> Result<CallToolResult, McpError> {
    let records = service.store(params.urls).await?;

    let stored = records
        .into_iter()
        .map(|record| {
            let payload_size = human_size(record.data.len() as u64);
            StoredImage { url: record.url, hash_key: record.hash_key, timestamp: record.timestamp, payload_size }
        })
        .collect();

    json_result(&StoreOutput { stored })
}
