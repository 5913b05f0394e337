//! Unified error types for imgcache.
//!
//! Every variant renders with a stable upper-case code prefix so callers
//! and MCP clients can branch on the kind without parsing the message.

use std::path::PathBuf;

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The resolved cache file does not exist.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Disk I/O failed for a reason other than not-found.
    #[error("STORE_ERROR: {}: {source}", .path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cache file could not be decoded (corrupt, truncated or written
    /// with a different compression setting).
    #[error("DECODE_ERROR: {0}")]
    Decode(String),

    /// Remote retrieval failed.
    #[error("RETRIEVAL_ERROR: {url}: {reason}")]
    Retrieval { url: String, status_code: Option<u16>, reason: String },

    /// Flush found nothing to delete.
    #[error("EMPTY_CACHE: {} has no cache files", .0.display())]
    EmptyCache(PathBuf),

    /// Hook registration used an unknown event name.
    #[error("UNKNOWN_EVENT: {0}")]
    UnknownEvent(String),

    /// Invalid input parameters (e.g., empty URL).
    #[error("INVALID_ARGUMENT: {0}")]
    InvalidArgument(String),

    /// A spawned batch task panicked or was cancelled.
    #[error("TASK_FAILED: {0}")]
    Task(String),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub fn store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Store { path: path.into(), source }
    }

    /// Whether this error means the cache file was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Task(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidArgument(_) | Error::UnknownEvent(_) => -32602,
            Error::NotFound(_) => -32001,
            Error::Store { .. } => -32002,
            Error::Decode(_) => -32003,
            Error::Retrieval { .. } => -32004,
            Error::EmptyCache(_) => -32005,
            Error::Task(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
