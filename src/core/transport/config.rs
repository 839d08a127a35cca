//! Transport configuration types.

use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (default for MCP).
    #[cfg(feature = "stdio")]
    Stdio,

    /// HTTP transport with JSON-RPC over POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

#[cfg(feature = "http")]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "stdio")]
        {
            return Self::Stdio;
        }

        #[cfg(all(not(feature = "stdio"), feature = "http"))]
        {
            return Self::Http(HttpConfig::default());
        }

        #[cfg(not(any(feature = "stdio", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or http");
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

impl TransportConfig {
    /// Load transport config from `MCP_TRANSPORT` and the `MCP_HTTP_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the transport config from a variable lookup.
    ///
    /// An unset or empty `MCP_TRANSPORT` selects the default transport.
    /// Unknown transports, malformed ports and relative RPC paths are errors.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let transport = var("MCP_TRANSPORT")
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match transport.as_str() {
            "" => Ok(Self::default()),
            #[cfg(feature = "stdio")]
            "stdio" => Ok(Self::Stdio),
            #[cfg(feature = "http")]
            "http" => {
                let mut http = HttpConfig::default();
                if let Some(port) = var("MCP_HTTP_PORT") {
                    http.port = port.trim().parse().map_err(|_| {
                        Error::config(format!("MCP_HTTP_PORT must be a port number, got '{port}'"))
                    })?;
                }
                if let Some(host) = var("MCP_HTTP_HOST")
                    && !host.trim().is_empty()
                {
                    http.host = host.trim().to_string();
                }
                if let Some(path) = var("MCP_HTTP_PATH") {
                    if !path.starts_with('/') {
                        return Err(Error::config(format!(
                            "MCP_HTTP_PATH must start with '/', got '{path}'"
                        )));
                    }
                    http.rpc_path = path;
                }
                if let Some(cors) = var("MCP_HTTP_CORS") {
                    http.enable_cors = !matches!(
                        cors.trim().to_lowercase().as_str(),
                        "false" | "0" | "no" | "off"
                    );
                }
                Ok(Self::Http(http))
            }
            other => Err(Error::config(format!(
                "unsupported MCP_TRANSPORT '{other}'"
            ))),
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_path),
        }
    }
}

#[cfg(all(test, feature = "stdio", feature = "http"))]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<TransportConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        TransportConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_unset_transport_is_default() {
        assert!(matches!(load(&[]).unwrap(), TransportConfig::Stdio));
        assert!(matches!(
            load(&[("MCP_TRANSPORT", " STDIO ")]).unwrap(),
            TransportConfig::Stdio
        ));
    }

    #[test]
    fn test_http_from_vars() {
        let config = load(&[
            ("MCP_TRANSPORT", "http"),
            ("MCP_HTTP_PORT", "9100"),
            ("MCP_HTTP_PATH", "/rpc"),
            ("MCP_HTTP_CORS", "off"),
        ])
        .unwrap();

        let TransportConfig::Http(http) = config else {
            panic!("expected http transport");
        };
        assert_eq!(http.port, 9100);
        assert_eq!(http.host, "127.0.0.1");
        assert_eq!(http.rpc_path, "/rpc");
        assert!(!http.enable_cors);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(load(&[("MCP_TRANSPORT", "tcp")]).is_err());
        assert!(load(&[("MCP_TRANSPORT", "http"), ("MCP_HTTP_PORT", "eighty")]).is_err());
        assert!(load(&[("MCP_TRANSPORT", "http"), ("MCP_HTTP_PATH", "mcp")]).is_err());
    }

    #[test]
    fn test_default_is_stdio() {
        assert!(matches!(TransportConfig::default(), TransportConfig::Stdio));
    }

    #[test]
    fn test_http_description() {
        let config = TransportConfig::Http(HttpConfig {
            port: 9000,
            host: "0.0.0.0".to_string(),
            ..Default::default()
        });
        assert_eq!(config.description(), "HTTP on 0.0.0.0:9000/mcp");
    }
}
