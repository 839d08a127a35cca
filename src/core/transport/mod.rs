//! Transport layer for the proxy server.
//!
//! This module provides different transport implementations:
//! - **STDIO**: Standard input/output via rmcp (default for MCP) - feature: `stdio`
//! - **HTTP**: JSON-RPC over POST requests, including the proxy's
//!   `tools/add` and `tools/remove` methods - feature: `http`
//!
//! Each transport handles the connection lifecycle and delegates
//! message processing to the [`ProxyServer`](crate::core::ProxyServer).

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
