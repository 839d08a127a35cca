//! Command-line surface.
//!
//! ```text
//! mcp_proxy_server tool <name> <description> <parameters> [<script>] [-e <command>]
//! mcp_proxy_server tool --unregister <name>
//! mcp_proxy_server list [--json]
//! mcp_proxy_server start
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use crate::core::{Config, ProxyServer, TransportService};
use crate::domains::tools::{AddToolParams, ToolDefinition, ToolSource};

/// Expose local scripts and shell commands as MCP tools.
#[derive(Parser, Debug)]
#[command(
    name = "mcp_proxy_server",
    version,
    about = "Expose local scripts and shell commands as MCP tools",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Registry file (default: ~/.mcpt/proxy_config.json)
    #[arg(long = "config", global = true, env = "MCP_PROXY_CONFIG", value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a script or inline command as a tool, or unregister one
    Tool(ToolCommand),

    /// List registered tools
    List(ListCommand),

    /// Run the proxy server on the configured transport
    Start,
}

/// Arguments of `tool`.
#[derive(Args, Debug)]
pub struct ToolCommand {
    /// Tool name
    pub name: String,

    /// Tool description
    #[arg(required_unless_present = "unregister")]
    pub description: Option<String>,

    /// Parameter signature, e.g. "a:int,b:int"
    #[arg(required_unless_present = "unregister")]
    pub parameters: Option<String>,

    /// Executable script to run
    pub script: Option<String>,

    /// Inline shell command to run instead of a script
    #[arg(short = 'e', long = "command", value_name = "COMMAND")]
    pub command: Option<String>,

    /// Remove the named tool instead of registering it
    #[arg(long)]
    pub unregister: bool,
}

/// Arguments of `list`.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Log level from -v/-q, falling back to the configured level.
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => configured,
            1 => "debug",
            _ => "trace",
        }
    }

    /// Apply command-line overrides to `config`.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(path) = &self.registry {
            config.registry.path = Some(path.clone());
        }
        config
    }
}

/// Run the parsed command.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let config = cli.apply(config);

    match cli.command {
        Commands::Tool(cmd) => {
            let server = ProxyServer::new(config)?;
            execute_tool(&cmd, &server, &mut std::io::stdout().lock())
        }
        Commands::List(cmd) => {
            let server = ProxyServer::new(config)?;
            execute_list(&cmd, &server, &mut std::io::stdout().lock())
        }
        Commands::Start => {
            let transport = TransportService::new(config.transport.clone());
            let server = ProxyServer::new(config)?;
            transport.run(server).await?;
            Ok(())
        }
    }
}

/// Register or unregister a tool.
pub fn execute_tool(cmd: &ToolCommand, server: &ProxyServer, out: &mut impl Write) -> Result<()> {
    if cmd.unregister {
        server
            .remove_tool(&cmd.name)
            .with_context(|| format!("failed to unregister tool '{}'", cmd.name))?;
        writeln!(out, "Unregistered tool '{}'", cmd.name)?;
        return Ok(());
    }

    let params = AddToolParams {
        name: cmd.name.clone(),
        description: cmd.description.clone().unwrap_or_default(),
        parameters: cmd.parameters.clone().unwrap_or_default(),
        script_path: cmd.script.clone(),
        command: cmd.command.clone(),
    };
    let def = server
        .add_tool(&params)
        .with_context(|| format!("failed to register tool '{}'", cmd.name))?;

    writeln!(
        out,
        "Registered tool '{}' in {}",
        def.name,
        server.registry().store().path().display()
    )?;
    Ok(())
}

/// Print the registered tools.
pub fn execute_list(cmd: &ListCommand, server: &ProxyServer, out: &mut impl Write) -> Result<()> {
    let tools = server.registry().list();

    if cmd.json {
        let descriptors: Vec<_> = tools.iter().map(ToolDefinition::to_tool).collect();
        serde_json::to_writer_pretty(&mut *out, &descriptors)?;
        writeln!(out)?;
        return Ok(());
    }

    if tools.is_empty() {
        writeln!(out, "No tools registered.")?;
        return Ok(());
    }

    let rows: Vec<[String; 4]> = tools
        .iter()
        .map(|t| {
            let source = match &t.source {
                ToolSource::Script(path) => format!("script: {}", path.display()),
                ToolSource::Command(command) => format!("command: {command}"),
            };
            [
                t.name.clone(),
                t.parameters.to_string(),
                source,
                t.description.clone(),
            ]
        })
        .collect();
    write_table(out, ["NAME", "PARAMETERS", "SOURCE", "DESCRIPTION"], &rows)?;
    Ok(())
}

fn write_table(out: &mut impl Write, header: [&str; 4], rows: &[[String; 4]]) -> std::io::Result<()> {
    let mut widths = header.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 4]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(header))?;
    for row in rows {
        writeln!(out, "{}", line(row.each_ref().map(String::as_str)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn server_in(dir: &TempDir) -> ProxyServer {
        ProxyServer::new(Config::default().with_registry_path(dir.path().join("proxy_config.json")))
            .unwrap()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mcp_proxy_server").chain(args.iter().copied())).unwrap()
    }

    fn tool_command(cli: Cli) -> ToolCommand {
        match cli.command {
            Commands::Tool(cmd) => cmd,
            other => panic!("expected tool command, got {other:?}"),
        }
    }

    #[test]
    fn test_register_with_script() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("add.sh").to_string_lossy().into_owned();
        let cmd = tool_command(parse(&["tool", "add_numbers", "Adds two numbers", "a:int,b:int", &script]));

        let server = server_in(&dir);
        let mut out = Vec::new();
        execute_tool(&cmd, &server, &mut out).unwrap();

        let def = server_in(&dir).registry().lookup("add_numbers").unwrap();
        assert_eq!(def.script_path().unwrap().to_string_lossy(), script);
        assert!(String::from_utf8(out).unwrap().contains("Registered tool 'add_numbers'"));
    }

    #[test]
    fn test_register_with_inline_command() {
        let dir = TempDir::new().unwrap();
        let cmd = tool_command(parse(&[
            "tool",
            "add_op",
            "Adds given numbers",
            "a:int,b:int",
            "-e",
            "echo \"$a + $b = $(($a+$b))\"",
        ]));

        let server = server_in(&dir);
        execute_tool(&cmd, &server, &mut Vec::new()).unwrap();
        assert_eq!(
            server_in(&dir).registry().lookup("add_op").unwrap().command(),
            Some("echo \"$a + $b = $(($a+$b))\"")
        );
    }

    #[test]
    fn test_register_without_script_or_command_fails() {
        let dir = TempDir::new().unwrap();
        let cmd = tool_command(parse(&["tool", "invalid", "Invalid tool", "x:int"]));

        let server = server_in(&dir);
        assert!(execute_tool(&cmd, &server, &mut Vec::new()).is_err());
        assert!(server.registry().is_empty());
    }

    #[test]
    fn test_register_requires_description_and_parameters() {
        let result = Cli::try_parse_from(["mcp_proxy_server", "tool", "lonely"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unregister() {
        let dir = TempDir::new().unwrap();
        let server = server_in(&dir);
        let add = tool_command(parse(&["tool", "test_tool", "Test tool", "x:int", "-e", "echo $x"]));
        execute_tool(&add, &server, &mut Vec::new()).unwrap();

        let remove = tool_command(parse(&["tool", "--unregister", "test_tool"]));
        execute_tool(&remove, &server, &mut Vec::new()).unwrap();
        assert!(server_in(&dir).registry().lookup("test_tool").is_none());
    }

    #[test]
    fn test_unregister_unknown_fails() {
        let dir = TempDir::new().unwrap();
        let remove = tool_command(parse(&["tool", "--unregister", "ghost"]));
        let err = execute_tool(&remove, &server_in(&dir), &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("Tool not found: ghost"));
    }

    #[test]
    fn test_list_table_and_json() {
        let dir = TempDir::new().unwrap();
        let server = server_in(&dir);
        let add = tool_command(parse(&["tool", "greet", "Say hello", "who", "-e", "echo hi $who"]));
        execute_tool(&add, &server, &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        execute_list(&ListCommand { json: false }, &server, &mut out).unwrap();
        let table = String::from_utf8(out).unwrap();
        assert!(table.starts_with("NAME"));
        assert!(table.contains("greet"));
        assert!(table.contains("who:string"));
        assert!(table.contains("command: echo hi $who"));

        let mut out = Vec::new();
        execute_list(&ListCommand { json: true }, &server, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["name"], "greet");
    }

    #[test]
    fn test_list_empty() {
        let dir = TempDir::new().unwrap();
        let mut out = Vec::new();
        execute_list(&ListCommand { json: false }, &server_in(&dir), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No tools registered.\n");
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["-vv", "--config", "/tmp/r.json", "list"]);
        assert_eq!(cli.log_level("info"), "trace");
        let config = cli.apply(Config::default());
        assert_eq!(config.registry.path, Some(PathBuf::from("/tmp/r.json")));
    }
}
