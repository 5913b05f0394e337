//! image_fetch tool implementation.
//!
//! Serves each URL from the cache, retrieving and storing it on a miss.
//! A URL that cannot be retrieved yields a failure entry instead of an error,
//! so one bad URL does not hide the others.

use imgcache_core::CacheService;
use rmcp::{ErrorData as McpError, model::CallToolResult};

use crate::tools::{ImageUrlsParams, json_result};

/// Implementation of the image_fetch tool.
pub async fn fetch_impl(service: &CacheService, params: ImageUrlsParams) -> Result<CallToolResult, McpError> {
    let outcomes = service.fetch(params.urls).await?;

    let failed = outcomes.as_slice().iter().filter(|o| o.is_error()).count();
    if failed > 0 {
        tracing::info!(failed, total = outcomes.len(), "image_fetch finished with failures");
    }

    json_result(&outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::UrlsParam;
    use crate::tools::test_support::{MISSING, service, text_json};
    use tempfile::TempDir;

    const URL: &str = "https://img.example.org/logo.png";

    #[tokio::test]
    async fn test_fetch_single_is_object() {
        let tmp = TempDir::new().unwrap();
        let service = service(&tmp);

        let params = ImageUrlsParams { urls: UrlsParam::One(URL.into()) };
        let first = text_json(&fetch_impl(&service, params.clone()).await.unwrap());
        assert_eq!(first["cache"], "MISS");
        assert!(first["hashKey"].is_string());

        let second = text_json(&fetch_impl(&service, params).await.unwrap());
        assert_eq!(second["cache"], "HIT");
    }

    #[tokio::test]
    async fn test_fetch_list_reports_failures_inline() {
        let tmp = TempDir::new().unwrap();
        let service = service(&tmp);

        let params = ImageUrlsParams { urls: UrlsParam::Many(vec![URL.into(), MISSING.into()]) };
        let output = text_json(&fetch_impl(&service, params).await.unwrap());

        let items = output.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["url"], URL);
        assert_eq!(items[1]["url"], MISSING);
        assert_eq!(items[1]["statusCode"], 404);
    }

    #[tokio::test]
    async fn test_fetch_empty_list_rejected() {
        let tmp = TempDir::new().unwrap();
        let service = service(&tmp);

        let err = fetch_impl(&service, ImageUrlsParams { urls: UrlsParam::Many(vec![]) }).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
