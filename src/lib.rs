//! MCP Proxy Server Library
//!
//! This crate turns local scripts and inline shell commands into MCP tools.
//! Tools are registered with a name, a description and a parameter
//! signature such as `a:int,b:int`; the registry is persisted per user and
//! every call runs the tool's process with its arguments bound as
//! environment variables.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the [`ProxyServer`] façade and transports
//! - **domains::tools**: parameter parsing, the persisted registry and the executor
//! - **cli**: the command-line surface (`tool`, `list`, `start`)
//!
//! # Example
//!
//! ```rust,no_run
//! use mcp_proxy_server::{Config, ProxyServer};
//! use mcp_proxy_server::domains::tools::AddToolParams;
//!
//! fn main() -> anyhow::Result<()> {
//!     let server = ProxyServer::new(Config::from_env()?)?;
//!     server.add_tool(&AddToolParams {
//!         name: "add".into(),
//!         description: "Adds two numbers".into(),
//!         parameters: "a:int,b:int".into(),
//!         command: Some("echo $(($a+$b))".into()),
//!         ..Default::default()
//!     })?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, ProxyServer, Result};
