//! Configuration management for the MCP proxy server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables or defaults. It is passed explicitly
//! to every constructor that needs it.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::error::{Error, Result};

/// File name of the registry, relative to the registry directory.
pub const REGISTRY_FILE_NAME: &str = "proxy_config.json";

/// Directory under the user's home that holds the registry.
pub const REGISTRY_DIR_NAME: &str = ".mcpt";

/// Main configuration structure for the proxy server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Registry file location.
    pub registry: RegistryConfig,

    /// How tool processes are run.
    pub executor: ExecutorConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Where the registry lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Explicit registry file. `None` means `$HOME/.mcpt/proxy_config.json`.
    pub path: Option<PathBuf>,
}

impl RegistryConfig {
    /// Resolve the registry file path for the invoking user.
    pub fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| Error::config("cannot determine home directory; set MCP_PROXY_CONFIG"))?;
        Ok(home.join(REGISTRY_DIR_NAME).join(REGISTRY_FILE_NAME))
    }
}

/// Tool process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Shell that runs inline commands as `<shell> -c <command>`.
    pub shell: String,

    /// Per-call deadline in seconds; `0` waits indefinitely.
    pub timeout_secs: u64,
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "mcp-proxy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            registry: RegistryConfig::default(),
            executor: ExecutorConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with the registry stored at `path`.
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry.path = Some(path.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`, `MCP_PROXY_CONFIG`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(path) = std::env::var("MCP_PROXY_CONFIG")
            && !path.trim().is_empty()
        {
            config.registry.path = Some(PathBuf::from(path));
        }

        if let Ok(shell) = std::env::var("MCP_PROXY_SHELL")
            && !shell.trim().is_empty()
        {
            config.executor.shell = shell;
        }

        if let Ok(secs) = std::env::var("MCP_PROXY_TIMEOUT_SECS") {
            config.executor.timeout_secs = secs.trim().parse().map_err(|_| {
                Error::config(format!("MCP_PROXY_TIMEOUT_SECS must be a whole number, got '{secs}'"))
            })?;
            info!("Tool execution timeout: {}s", config.executor.timeout_secs);
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env()?;

        Ok(config)
    }
}
