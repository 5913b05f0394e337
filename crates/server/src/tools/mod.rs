//! MCP tool implementations.
//!
//! This module contains all tools exposed by the imgcache server.

pub mod cache;
pub mod image_fetch;
pub mod image_store;

use imgcache_core::Urls;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use image_fetch::fetch_impl;
pub use image_store::store_impl;

/// One image URL or a list of them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum UrlsParam {
    One(String),
    Many(Vec<String>),
}

impl From<UrlsParam> for Urls {
    fn from(param: UrlsParam) -> Self {
        match param {
            UrlsParam::One(url) => Urls::One(url),
            UrlsParam::Many(urls) => Urls::Many(urls),
        }
    }
}

/// Parameters for tools that take a single image URL.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageUrlParams {
    /// The image URL, exactly as it was cached.
    pub url: String,
}

/// Parameters for tools that take one or more image URLs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageUrlsParams {
    /// A single URL or an array of URLs.
    pub urls: UrlsParam,
}

/// Render `output` as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| McpError::internal_error(format!("Failed to serialize output: {e}"), None))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
