//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the proxy,
//! including error handling, configuration, the protocol server façade,
//! and transport layer abstractions.

pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use server::ProxyServer;
pub use transport::{TransportConfig, TransportService};
