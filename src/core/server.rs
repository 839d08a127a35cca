//! MCP proxy server implementation and lifecycle management.
//!
//! This module contains the server handler that exposes registered tools
//! over MCP. It wires the [`ToolRegistry`] to the [`Executor`] and adapts
//! their results into protocol responses:
//!
//! - `tools/list` lists the live registry
//! - `tools/call` runs the tool; a failed run is a tool result with
//!   `isError`, while an unknown tool is a protocol error
//! - adding and removing tools go through [`ProxyServer::add_tool`] and
//!   [`ProxyServer::remove_tool`] (HTTP `tools/add` / `tools/remove`, CLI)

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::config::Config;
use super::error::Result;
use crate::domains::tools::{
    AddToolParams, Executor, RegistryStore, ToolArgs, ToolDefinition, ToolError, ToolRegistry,
    ToolResult,
};

/// The proxy's MCP server handler.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct ProxyServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registered tools, loaded once at construction.
    registry: Arc<ToolRegistry>,

    /// Runs tool processes.
    executor: Executor,
}

impl ProxyServer {
    /// Create a proxy server, loading the registry from disk.
    ///
    /// Fails if the registry file exists but cannot be read or parsed.
    pub fn new(config: Config) -> Result<Self> {
        let path = config.registry.resolve_path()?;
        let registry = ToolRegistry::load(RegistryStore::new(path))?;
        let executor = Executor::new(&config.executor);

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            executor,
        })
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Register (or replace) a tool and flush the registry.
    pub fn add_tool(&self, params: &AddToolParams) -> ToolResult<ToolDefinition> {
        self.registry.add_tool(
            &params.name,
            &params.description,
            &params.parameters,
            params.script_path.as_deref(),
            params.command.as_deref(),
        )
    }

    /// Unregister a tool and flush the registry.
    pub fn remove_tool(&self, name: &str) -> ToolResult<ToolDefinition> {
        self.registry.remove_tool(name)
    }

    /// Protocol descriptors for every registered tool.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry.list().iter().map(ToolDefinition::to_tool).collect()
    }

    /// Call a tool by name.
    ///
    /// Returns `Err(NotFound)` for an unknown tool. A tool that ran and
    /// failed is `Ok` with an error result carrying the failure message.
    #[instrument(skip(self, args), fields(args = args.len()))]
    pub async fn call_tool(&self, name: &str, args: &ToolArgs) -> ToolResult<CallToolResult> {
        let Some(def) = self.registry.lookup(name) else {
            warn!("Unknown tool requested: {}", name);
            return Err(ToolError::not_found(name));
        };

        match self.executor.execute(&def, args).await {
            Ok(output) => {
                info!("Tool '{}' completed", name);
                Ok(CallToolResult::success(vec![Content::text(output.stdout)]))
            }
            Err(ToolError::Execution(e)) => {
                warn!("Tool '{}' failed: {}", name, e);
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
            Err(e) => Err(e),
        }
    }

    /// Release the server. Registry writes are already flushed, so there is
    /// nothing left to persist.
    pub fn close(self) {
        info!(
            "Closing proxy server ({} tool(s) registered)",
            self.registry.len()
        );
    }
}

impl ServerHandler for ProxyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: self.name().to_string(),
                version: self.version().to_string(),
                ..Default::default()
            },
            instructions: Some(
                "MCP proxy server. Each tool runs a local script or shell command registered \
                 by the user; arguments are passed as environment variables."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        info!("Listing tools");
        Ok(ListToolsResult {
            tools: ProxyServer::list_tools(self),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, request, _context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        info!("Calling tool: {}", request.name);
        let args = request
            .arguments
            .as_ref()
            .map(ToolArgs::from_json_object)
            .unwrap_or_default();

        ProxyServer::call_tool(self, &request.name, &args)
            .await
            .map_err(McpError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::{ArgValue, ErrorKind};
    use tempfile::TempDir;

    fn server_in(dir: &TempDir) -> ProxyServer {
        ProxyServer::new(Config::default().with_registry_path(dir.path().join("proxy_config.json")))
            .unwrap()
    }

    fn add_params(name: &str, command: &str) -> AddToolParams {
        AddToolParams {
            name: name.to_string(),
            description: "Adds given numbers".to_string(),
            parameters: "a:int,b:int".to_string(),
            script_path: None,
            command: Some(command.to_string()),
        }
    }

    fn text_of(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        }
    }

    #[test]
    fn test_add_and_list() {
        let dir = TempDir::new().unwrap();
        let server = server_in(&dir);
        server.add_tool(&add_params("add_op", "echo")).unwrap();

        let tools = server.list_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "add_op");
        assert_eq!(tools[0].input_schema["properties"]["a"]["type"], "integer");
    }

    #[test]
    fn test_info_reports_configured_identity() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default().with_registry_path(dir.path().join("proxy_config.json"));
        config.server.name = "local-scripts".to_string();

        let info = ProxyServer::new(config).unwrap().get_info();
        assert_eq!(info.server_info.name, "local-scripts");
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn test_new_server_reflects_persisted_registry() {
        let dir = TempDir::new().unwrap();
        server_in(&dir).add_tool(&add_params("add_op", "echo")).unwrap();

        let server = server_in(&dir);
        assert!(server.registry().lookup("add_op").is_some());
        server.close();
    }

    #[test]
    fn test_new_fails_on_corrupt_registry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("proxy_config.json");
        std::fs::write(&path, "garbage").unwrap();

        let result = ProxyServer::new(Config::default().with_registry_path(path));
        assert!(result.is_err());
    }

    #[test]
    fn test_remove_unknown_tool() {
        let dir = TempDir::new().unwrap();
        let err = server_in(&dir).remove_tool("ghost").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_call_unknown_tool_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = server_in(&dir)
            .call_tool("never_registered", &ToolArgs::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_call_tool_returns_output() {
        let dir = TempDir::new().unwrap();
        let server = server_in(&dir);
        server
            .add_tool(&add_params("add_op", r#"echo "$a + $b = $(($a+$b))""#))
            .unwrap();

        let mut args = ToolArgs::new();
        args.insert("a", ArgValue::Int(5));
        args.insert("b", ArgValue::Int(3));

        let result = server.call_tool("add_op", &args).await.unwrap();
        assert_ne!(result.is_error, Some(true));
        assert!(text_of(&result).contains("5 + 3 = 8"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_run_is_an_error_result() {
        let dir = TempDir::new().unwrap();
        let server = server_in(&dir);
        server.add_tool(&add_params("fails", "echo bad >&2; exit 2")).unwrap();

        let result = server.call_tool("fails", &ToolArgs::new()).await.unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("code 2"));
        assert!(text_of(&result).contains("bad"));
    }
}
