//! image_is_cached and image_get tool implementations.

use imgcache_core::CacheService;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{ImageUrlParams, json_result};

/// Output from the image_is_cached tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IsCachedOutput {
    pub url: String,
    pub cached: bool,
}

/// Implementation of the image_is_cached tool.
pub async fn is_cached_impl(service: &CacheService, params: ImageUrlParams) -> Result<CallToolResult, McpError> {
    let cached = service.is_cached(&params.url).await?;
    json_result(&IsCachedOutput { url: params.url, cached })
}

/// Implementation of the image_get tool.
///
/// Fails with NOT_FOUND when the URL has no cache file.
pub async fn get_impl(service: &CacheService, params: ImageUrlParams) -> Result<CallToolResult, McpError> {
    let image = service.get(&params.url).await?;
    json_result(&image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{service, text_json};
    use tempfile::TempDir;

    const URL: &str = "https://img.example.org/logo.png";

    #[tokio::test]
    async fn test_get_impl_missing() {
        let tmp = TempDir::new().unwrap();
        let service = service(&tmp);

        let err = get_impl(&service, ImageUrlParams { url: URL.to_string() }).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let tmp = TempDir::new().unwrap();
        let service = service(&tmp);
        service.store(URL).await.unwrap();

        let result = get_impl(&service, ImageUrlParams { url: URL.to_string() }).await.unwrap();
        let output = text_json(&result);
        assert_eq!(output["url"], URL);
        assert_eq!(output["cache"], "HIT");
        assert!(output["size"].is_string());
    }

    #[tokio::test]
    async fn test_is_cached_impl() {
        let tmp = TempDir::new().unwrap();
        let service = service(&tmp);

        let before = is_cached_impl(&service, ImageUrlParams { url: URL.to_string() }).await.unwrap();
        assert_eq!(text_json(&before)["cached"], false);

        service.fetch(URL).await.unwrap();
        let after = is_cached_impl(&service, ImageUrlParams { url: URL.to_string() }).await.unwrap();
        assert_eq!(text_json(&after)["cached"], true);
    }
}
