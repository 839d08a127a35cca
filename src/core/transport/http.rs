//! HTTP transport implementation.
//!
//! HTTP server with JSON-RPC over POST requests. Besides the standard
//! `tools/list` and `tools/call`, it serves the proxy's management methods
//! `tools/add` and `tools/remove`.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::ProxyServer;
use crate::domains::tools::{AddToolParams, RemoveToolParams, ToolArgs, ToolError};

const PROTOCOL_VERSION: &str = "2024-11-05";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }

    /// Error response for a failed tool operation, tagged with its kind.
    pub fn tool_error(id: Option<Value>, err: &ToolError) -> Self {
        Self::error(
            id,
            err.error_code().0,
            err.to_string(),
            Some(json!({ "kind": err.kind().as_str() })),
        )
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, -32601, "Method not found", None)
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request", None)
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg, None)
    }

    /// Internal error.
    pub fn internal_error(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32603, msg, None)
    }
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: ProxyServer) -> TransportResult<()> {
        let addr = self.address();
        let app = router(server, &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (JSON-RPC over HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Router state: the proxy plus the endpoint it is mounted on.
#[derive(Clone)]
struct HttpState {
    server: ProxyServer,
    rpc_path: Arc<str>,
}

/// Build the axum router serving `server`.
pub fn router(server: ProxyServer, config: &HttpConfig) -> Router {
    let state = HttpState {
        server,
        rpc_path: Arc::from(config.rpc_path.as_str()),
    };

    let mut app = Router::new()
        .route(&config.rpc_path, post(handle_rpc))
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<HttpState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": &*state.rpc_path,
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0",
        "methods": ["initialize", "tools/list", "tools/call", "tools/add", "tools/remove"]
    }))
}

/// Health check endpoint.
async fn health_check(State(state): State<HttpState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "tools": state.server.registry().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(state): State<HttpState>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    let response = process_request(&state.server, request).await;

    (StatusCode::OK, Json(response))
}

/// Process a JSON-RPC request and return the response.
pub async fn process_request(server: &ProxyServer, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(server, request),
        "tools/list" => handle_tools_list(server, request),
        "tools/call" => handle_tools_call(server, request).await,
        "tools/add" => handle_tools_add(server, request),
        "tools/remove" => handle_tools_remove(server, request),

        // Notifications (no response needed for stateless HTTP)
        method if method.starts_with("notifications/") => {
            info!("Received notification: {}", method);
            JsonRpcResponse::success(request.id, Value::Null)
        }

        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Decode the request params into `T`, or produce the invalid-params response.
fn decode_params<T: serde::de::DeserializeOwned>(
    request: &JsonRpcRequest,
) -> Result<T, JsonRpcResponse> {
    let params = request
        .params
        .clone()
        .ok_or_else(|| JsonRpcResponse::invalid_params(request.id.clone(), "Missing params"))?;
    serde_json::from_value(params)
        .map_err(|e| JsonRpcResponse::invalid_params(request.id.clone(), e.to_string()))
}

fn handle_initialize(server: &ProxyServer, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing initialize request");

    let result = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": server.name(),
            "version": server.version()
        }
    });

    JsonRpcResponse::success(request.id, result)
}

fn handle_tools_list(server: &ProxyServer, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/list request");

    match serde_json::to_value(server.list_tools()) {
        Ok(tools) => JsonRpcResponse::success(request.id, json!({ "tools": tools })),
        Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
    }
}

async fn handle_tools_call(server: &ProxyServer, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/call request");

    #[derive(Deserialize)]
    struct CallParams {
        name: String,
        #[serde(default)]
        arguments: Value,
    }

    let params: CallParams = match decode_params(&request) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let args = match ToolArgs::from_json(&params.arguments) {
        Ok(args) => args,
        Err(e) => return JsonRpcResponse::tool_error(request.id, &e),
    };

    match server.call_tool(&params.name, &args).await {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
        },
        Err(e) => JsonRpcResponse::tool_error(request.id, &e),
    }
}

fn handle_tools_add(server: &ProxyServer, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/add request");

    let params: AddToolParams = match decode_params(&request) {
        Ok(p) => p,
        Err(response) => return response,
    };

    match server.add_tool(&params) {
        Ok(def) => match serde_json::to_value(def.to_tool()) {
            Ok(tool) => JsonRpcResponse::success(request.id, json!({ "tool": tool })),
            Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
        },
        Err(e) => JsonRpcResponse::tool_error(request.id, &e),
    }
}

fn handle_tools_remove(server: &ProxyServer, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/remove request");

    let params: RemoveToolParams = match decode_params(&request) {
        Ok(p) => p,
        Err(response) => return response,
    };

    match server.remove_tool(&params.name) {
        Ok(def) => JsonRpcResponse::success(request.id, json!({ "removed": def.name })),
        Err(e) => JsonRpcResponse::tool_error(request.id, &e),
    }
}
