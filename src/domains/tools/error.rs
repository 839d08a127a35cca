//! Tool-specific error types.

use rmcp::{ErrorData as McpError, model::ErrorCode};
use serde_json::json;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for tool registry and execution operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The registration or call arguments were rejected before any side effect.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No tool is registered under the requested name.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The registry file could not be read or written.
    #[error("Failed to {action} registry file {}: {source}", .path.display())]
    Persistence {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry file exists but does not hold a valid registry.
    #[error("Corrupt registry file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// The tool's process failed to run to a successful completion.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Machine-readable classification of a [`ToolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Persistence,
    Execution,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Persistence => "persistence",
            Self::Execution => "execution",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToolError {
    /// Create a new "validation" error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn persistence(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Persistence { .. } | Self::Corrupt { .. } => ErrorKind::Persistence,
            Self::Execution(_) => ErrorKind::Execution,
        }
    }

    /// JSON-RPC error code reported to protocol clients.
    pub fn error_code(&self) -> ErrorCode {
        match self.kind() {
            ErrorKind::Validation => ErrorCode::INVALID_PARAMS,
            ErrorKind::NotFound => ErrorCode::RESOURCE_NOT_FOUND,
            ErrorKind::Persistence | ErrorKind::Execution => ErrorCode::INTERNAL_ERROR,
        }
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let data = json!({ "kind": err.kind().as_str() });
        McpError::new(err.error_code(), err.to_string(), Some(data))
    }
}

/// Failure of a single tool process run.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The process could not be started (missing script, not executable, ...).
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully.
    #[error("{}", exit_message(.code, .stderr))]
    Exit { code: Option<i32>, stderr: String },

    /// Waiting on the process or collecting its output failed.
    #[error("Failed to collect process output: {0}")]
    Wait(#[source] std::io::Error),

    /// The process outlived its deadline and was killed.
    #[error("Tool execution timed out after {}s", .after.as_secs_f64())]
    Timeout { after: Duration },
}

impl ExecutionError {
    /// Exit code of the process, when it exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exit { code, .. } => *code,
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn exit_message(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("Process exited with code {code}"),
        None => "Process terminated by signal".to_string(),
    };
    if stderr.is_empty() {
        status
    } else {
        format!("{status}: {stderr}")
    }
}
