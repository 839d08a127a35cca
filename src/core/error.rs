//! Error types and handling for the MCP proxy server.
//!
//! This module defines a unified error type that can represent errors from
//! the tools domain, the transport layer and external dependencies.

use thiserror::Error;

/// A specialized Result type for proxy server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the proxy server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the tools domain.
    #[error(transparent)]
    Tool(#[from] crate::domains::tools::ToolError),

    /// Error originating from the transport layer.
    #[error(transparent)]
    Transport(#[from] super::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from file operations or network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
