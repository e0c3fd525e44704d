//! Tooling around the pagedown converter.
//!
//! Fetches pages over HTTP, adds a metadata header, truncates long output and
//! saves results to disk. The same operations are exposed as two tools,
//! `html_to_markdown` and `save_markdown`, served as newline-delimited
//! JSON-RPC over stdio by [`server::serve`].

pub mod fetch;
pub mod postprocess;
pub mod server;
pub mod storage;
pub mod title;
pub mod tools;

use std::path::PathBuf;

pub use fetch::{FetchConfig, Fetcher};
pub use tools::{ToolOptions, ToolOutput, ToolService};

/// Errors raised by the tool layer
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidParams(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to fetch URL: {0}")]
    Http(String),

    #[error("Failed to fetch URL: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Convert(#[from] pagedown::ConvertError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ToolError {
    /// Errors caused by the caller's request rather than by the outside world.
    pub fn is_request_error(&self) -> bool {
        matches!(self, ToolError::InvalidParams(_) | ToolError::UnknownTool(_))
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = ToolError::Status {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to fetch URL: 404 Not Found");
    }

    #[test]
    fn test_request_errors() {
        assert!(ToolError::InvalidParams("x".into()).is_request_error());
        assert!(ToolError::UnknownTool("x".into()).is_request_error());
        assert!(!ToolError::Http("timeout".into()).is_request_error());
    }
}
