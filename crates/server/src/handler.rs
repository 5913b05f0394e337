//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use imgcache_core::CacheService;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::tools::{self, ImageUrlParams, ImageUrlsParams};

/// The main MCP server handler for imgcache.
#[derive(Clone)]
pub struct ImageCacheServer {
    service: Arc<CacheService>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ImageCacheServer {
    /// Create a new server handler over `service`.
    pub fn new(service: Arc<CacheService>) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    #[tool(description = "Check whether an image URL has a cache file. Never touches the network.")]
    async fn image_is_cached(&self, params: Parameters<ImageUrlParams>) -> Result<CallToolResult, McpError> {
        tools::cache::is_cached_impl(&self.service, params.0).await
    }

    #[tool(description = "Read a cached image as a base64 data URI with its size. Fails with NOT_FOUND if not cached.")]
    async fn image_get(&self, params: Parameters<ImageUrlParams>) -> Result<CallToolResult, McpError> {
        tools::cache::get_impl(&self.service, params.0).await
    }

    /// Fetch one or more images, serving from the cache when possible.
    ///
    /// Each result is marked HIT or MISS; URLs that could not be retrieved
    /// come back as entries with a status code and message.
    #[tool(
        description = "Fetch images, serving cached copies when present and caching the rest. Takes one URL or many."
    )]
    async fn image_fetch(&self, params: Parameters<ImageUrlsParams>) -> Result<CallToolResult, McpError> {
        tools::fetch_impl(&self.service, params.0).await
    }

    #[tool(
        description = "Download images and overwrite their cache files. Fails if any URL cannot be retrieved."
    )]
    async fn image_store(&self, params: Parameters<ImageUrlsParams>) -> Result<CallToolResult, McpError> {
        tools::store_impl(&self.service, params.0).await
    }

    #[tool(description = "Delete the cache files of one or more image URLs. Fails at the first uncached URL.")]
    async fn image_remove(&self, params: Parameters<ImageUrlsParams>) -> Result<CallToolResult, McpError> {
        tools::cache::remove_impl(&self.service, params.0).await
    }

    #[tool(description = "Delete every cache file in the cache directory and report how many were removed.")]
    async fn image_flush(&self) -> Result<CallToolResult, McpError> {
        tools::cache::flush_impl(&self.service).await
    }
}

impl ServerHandler for ImageCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "imgcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Disk cache for remote images. Images are returned as base64 data URIs keyed by their URL.".into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::service;
    use tempfile::TempDir;

    #[test]
    fn test_lists_image_tools() {
        let tmp = TempDir::new().unwrap();
        let server = ImageCacheServer::new(service(&tmp));

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            ["image_fetch", "image_flush", "image_get", "image_is_cached", "image_remove", "image_store"]
        );
    }

    #[test]
    fn test_server_info() {
        let tmp = TempDir::new().unwrap();
        let info = ImageCacheServer::new(service(&tmp)).get_info();
        assert_eq!(info.server_info.name, "imgcache");
        assert!(info.capabilities.tools.is_some());
    }
}
