//! imgcache MCP server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use imgcache_client::{ClientConfig, ImageClient};
use imgcache_core::{CacheConfig, CacheEvent, CacheService};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = CacheConfig::load()?;
    tracing::info!(dir = %config.dir.display(), "Starting imgcache server on stdio transport");

    let client = ImageClient::new(ClientConfig {
        user_agent: format!("imgcache-mcp/{}", env!("CARGO_PKG_VERSION")),
        ..Default::default()
    })?;

    let service = Arc::new(CacheService::new(Arc::new(client), config));
    log_events(&service);

    let handler = handler::ImageCacheServer::new(service);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}

fn log_events(service: &CacheService) {
    for event in CacheEvent::ALL {
        service.on(event, move |payload| match &payload.error {
            Some(error) => tracing::warn!(%event, url = ?payload.url, %error, "cache operation failed"),
            None => tracing::debug!(%event, url = ?payload.url, "cache operation completed"),
        });
    }
}
