//! image_remove and image_flush tool implementations.

use imgcache_core::CacheService;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{ImageUrlsParams, json_result};

/// Output from the image_remove tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RemoveOutput {
    /// URLs whose cache files were deleted, in request order.
    pub removed: Vec<String>,
}

/// Implementation of the image_remove tool.
///
/// Stops at the first URL that is not cached.
pub async fn remove_impl(service: &CacheService, params: ImageUrlsParams) -> Result<CallToolResult, McpError> {
    let removed = service.remove(params.urls).await?;
    json_result(&RemoveOutput { removed })
}

/// Implementation of the image_flush tool.
pub async fn flush_impl(service: &CacheService) -> Result<CallToolResult, McpError> {
    let report = service.flush().await?;
    json_result(&report)
}
