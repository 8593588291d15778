//! HTTP transport implementation.
//!
//! JSON-RPC over POST for tool calls, with an opt-in server-sent-event
//! response mode, and a GET endpoint for server-initiated notification
//! streams. Transport-level validation (missing `toolName`/`params`) is
//! rejected here with an HTTP error status and never reaches the
//! dispatcher.

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
    routing::{get, post},
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, instrument, warn};

use super::streaming::StreamSession;
use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::domains::tools::{CallRequest, Outcome, ResultEnvelope};

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
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
    pub code: i64,
    pub message: String,
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
    pub fn error(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// Invalid request error (transport-level validation failure).
    pub fn invalid_request(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32600, msg)
    }

    /// Serialize a dispatched result envelope onto the wire.
    pub fn from_envelope(envelope: &ResultEnvelope) -> Self {
        match &envelope.outcome {
            Outcome::Success { content } => Self::success(
                envelope.correlation_id.clone(),
                json!({ "content": content }),
            ),
            Outcome::Failure { code, message } => {
                Self::error(envelope.correlation_id.clone(), *code, message.clone())
            }
        }
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The server instance.
    server: McpServer,
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
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = build_router(server, &self.config);

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
        info!("  → Tool calls:     POST {}", self.config.rpc_path);
        info!("  → Notifications:  GET  {}", self.config.rpc_path);
        info!("  → Health:         GET  /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the router serving the call, notification, health, and info
/// endpoints.
pub fn build_router(server: McpServer, config: &HttpConfig) -> Router {
    let state = AppState { server };

    let mut app = Router::new()
        .route(
            &config.rpc_path,
            post(handle_rpc).get(handle_notification_stream),
        )
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .with_state(state);

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
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": state.server.config().transport.http.rpc_path,
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0",
        "tools": state.server.list_tools(),
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle a tool call request.
///
/// Validates the request envelope, then either returns a single JSON
/// response or, when the caller asked for streaming semantics, an SSE
/// stream whose first event is the result envelope.
#[instrument(skip_all, fields(tool))]
async fn handle_rpc(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    let correlation_id = body
        .get("correlationId")
        .or_else(|| body.get("id"))
        .cloned();

    let Some(tool_name) = body
        .get("toolName")
        .or_else(|| body.get("method"))
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        warn!("Request rejected: missing 'toolName'");
        return transport_error(
            StatusCode::BAD_REQUEST,
            "missing required field 'toolName'",
            correlation_id,
        );
    };

    tracing::Span::current().record("tool", tool_name.as_str());

    let mut params = match body.get("params") {
        None => {
            warn!("Request rejected: missing 'params'");
            return transport_error(
                StatusCode::BAD_REQUEST,
                "missing required field 'params'",
                correlation_id,
            );
        }
        Some(value) => match value.as_object() {
            Some(map) => map.clone(),
            None => {
                warn!("Request rejected: 'params' is not an object");
                return transport_error(
                    StatusCode::BAD_REQUEST,
                    "field 'params' must be an object",
                    correlation_id,
                );
            }
        },
    };

    // The stream flag is transport metadata, not a tool parameter.
    let wants_stream = params
        .remove("stream")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    info!("Received tool call: {} (stream: {})", tool_name, wants_stream);
    let request = CallRequest::new(tool_name, params, correlation_id);

    if wants_stream {
        handle_streaming_call(&state, request).await
    } else {
        let envelope = state.server.dispatch(request).await;
        (StatusCode::OK, Json(JsonRpcResponse::from_envelope(&envelope))).into_response()
    }
}

/// Dispatch a call and answer it over a short-lived event stream: the
/// result envelope immediately, then a delayed completion notification,
/// then end of stream.
async fn handle_streaming_call(state: &AppState, request: CallRequest) -> Response {
    let streaming = state.server.config().streaming.clone();
    let tool_name = request.tool_name.clone();

    let (session, rx) = StreamSession::open(&streaming);

    let envelope = state.server.dispatch(request).await;
    let initial = serde_json::to_value(JsonRpcResponse::from_envelope(&envelope)).unwrap_or_default();
    session.send(initial).await;

    let completion = JsonRpcResponse::success(
        envelope.correlation_id.clone(),
        json!({
            "content": [{
                "type": "text",
                "text": format!("Streaming update: {tool_name} complete"),
            }]
        }),
    );
    session.spawn_completion(serde_json::to_value(completion).unwrap_or_default());

    sse_response(rx)
}

/// Server-initiated notification stream: announce availability, then
/// heartbeat until the client disconnects.
#[instrument(skip_all)]
async fn handle_notification_stream(State(state): State<AppState>) -> Response {
    info!("Notification stream client connected");
    let streaming = state.server.config().streaming.clone();

    let (session, rx) = StreamSession::open(&streaming);
    session.send(server_notification("Server is online")).await;
    session.spawn_heartbeat(server_notification("Server heartbeat"));

    sse_response(rx)
}

/// A JSON-RPC notification frame carrying a server message.
fn server_notification(message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "serverNotification",
        "params": { "message": message }
    })
}

/// Turn a session's frame receiver into an SSE response with caching
/// disabled.
fn sse_response(rx: mpsc::Receiver<Value>) -> Response {
    let stream = ReceiverStream::new(rx)
        .map(|frame| Ok::<_, Infallible>(Event::default().data(frame.to_string())));

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Sse::new(stream),
    )
        .into_response()
}

/// Transport-level error response (the dispatcher was never reached).
fn transport_error(status: StatusCode, message: &str, correlation_id: Option<Value>) -> Response {
    (
        status,
        Json(JsonRpcResponse::invalid_request(correlation_id, message)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let mut config = Config::default();
        // Keep streaming tests fast.
        config.streaming.completion_delay_ms = 5;
        config.streaming.heartbeat_interval_ms = 50;
        let http = config.transport.http.clone();
        let server = McpServer::new(config).unwrap();
        build_router(server, &http)
    }

    fn rpc_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_tax_call_returns_envelope() {
        let response = test_app()
            .oneshot(rpc_request(json!({
                "toolName": "calculate-tax",
                "params": {"amount": 100, "jurisdiction": "Texas"},
                "correlationId": 1
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["id"], 1);
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Amount = $100.00, Tax = $6.25, Total = $106.25"));
    }

    #[tokio::test]
    async fn test_jsonrpc_method_alias_accepted() {
        let response = test_app()
            .oneshot(rpc_request(json!({
                "jsonrpc": "2.0",
                "method": "calculate-tax",
                "params": {"amount": 10, "jurisdiction": "Texas"},
                "id": "abc"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], "abc");
        assert!(body["result"]["content"][0]["text"].as_str().unwrap().contains("Tax"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_protocol_failure_not_http_error() {
        let response = test_app()
            .oneshot(rpc_request(json!({
                "toolName": "unknown-tool",
                "params": {},
                "correlationId": 9
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], -32601);
        assert!(body["error"]["message"].as_str().unwrap().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_invalid_params_code() {
        let response = test_app()
            .oneshot(rpc_request(json!({
                "toolName": "calculate-tax",
                "params": {"amount": "a lot", "jurisdiction": "Texas"}
            })))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_missing_params_is_transport_error() {
        let response = test_app()
            .oneshot(rpc_request(json!({"toolName": "calculate-tax", "correlationId": 3})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], -32600);
        assert_eq!(body["id"], 3);
    }

    #[tokio::test]
    async fn test_missing_tool_name_is_transport_error() {
        let response = test_app()
            .oneshot(rpc_request(json!({"params": {}})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_streaming_call_emits_envelope_then_completion() {
        let response = test_app()
            .oneshot(rpc_request(json!({
                "toolName": "calculate-tax",
                "params": {"amount": 100, "jurisdiction": "Texas", "stream": true},
                "correlationId": 5
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/event-stream")
        );
        assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");

        let mut stream = response.into_body().into_data_stream();
        let mut frames = String::new();
        while let Some(chunk) = stream.next().await {
            frames.push_str(std::str::from_utf8(&chunk.unwrap()).unwrap());
        }

        assert!(frames.starts_with("data: "));
        assert!(frames.contains("Total = $106.25"));
        assert!(frames.contains("Streaming update: calculate-tax complete"));
    }

    #[tokio::test]
    async fn test_notification_stream_announces_server_online() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/mcp")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let mut stream = response.into_body().into_data_stream();
        let first = stream.next().await.unwrap().unwrap();
        let text = std::str::from_utf8(&first).unwrap();
        assert!(text.starts_with("data: "));
        assert!(text.contains("Server is online"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_root_lists_tools() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["protocol"], "JSON-RPC 2.0");
        assert_eq!(body["tools"][0]["name"], "calculate-tax");
    }
}
