//! MCP Proxy Server Entry Point
//!
//! Initializes logging, loads configuration and dispatches the command line.

use anyhow::Result;
use clap::Parser;
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, fmt};

use mcp_proxy_server::cli::{self, Cli};
use mcp_proxy_server::core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment
    let config = Config::from_env()?;

    init_logging(cli.log_level(&config.logging.level));

    debug!("{} v{}", config.server.name, config.server.version);

    cli::run(cli, config).await
}

/// Initialize the logging subsystem.
///
/// Logs always go to stderr; stdout belongs to the protocol and to command output.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
