//! Dispatcher - resolves, validates, and invokes tool calls.
//!
//! The dispatcher is the single place where a call request becomes a result
//! envelope. Caller mistakes (unknown tool, invalid params) map to stable
//! JSON-RPC error codes; unexpected handler failures are caught at this
//! boundary and surfaced as server errors. No retries are performed.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use super::definition::ToolContent;
use super::registry::ToolRegistry;

/// JSON-RPC error code: requested method/tool does not exist.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// JSON-RPC error code: params failed schema validation.
pub const INVALID_PARAMS: i64 = -32602;

/// JSON-RPC error code: unexpected server-side failure during execution.
pub const SERVER_ERROR: i64 = -32000;

/// An inbound tool call, already parsed by the transport.
#[derive(Debug, Clone)]
pub struct CallRequest {
    /// Name of the tool to invoke.
    pub tool_name: String,

    /// Call parameters.
    pub params: Map<String, Value>,

    /// Caller-supplied token echoed back in the envelope.
    pub correlation_id: Option<Value>,
}

impl CallRequest {
    /// Create a call request.
    pub fn new(tool_name: impl Into<String>, params: Map<String, Value>, correlation_id: Option<Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            params,
            correlation_id,
        }
    }
}

/// The outcome of a dispatched call: exactly one of success or failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The tool ran and produced content.
    Success {
        /// Ordered content items.
        content: Vec<ToolContent>,
    },
    /// The call failed at the protocol level.
    Failure {
        /// Stable numeric error code.
        code: i64,
        /// Human-readable message.
        message: String,
    },
}

/// The normalized wrapper returned for every dispatched call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEnvelope {
    /// Echo of the request's correlation id, when present.
    pub correlation_id: Option<Value>,

    /// Success or failure payload.
    pub outcome: Outcome,
}

impl ResultEnvelope {
    /// Build a success envelope.
    pub fn success(content: Vec<ToolContent>, correlation_id: Option<Value>) -> Self {
        Self {
            correlation_id,
            outcome: Outcome::Success { content },
        }
    }

    /// Build a failure envelope.
    pub fn failure(code: i64, message: impl Into<String>, correlation_id: Option<Value>) -> Self {
        Self {
            correlation_id,
            outcome: Outcome::Failure {
                code,
                message: message.into(),
            },
        }
    }

    /// Whether this envelope carries a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failure { .. })
    }
}

/// Dispatches call requests against a read-only registry.
///
/// Holds no mutable state across calls, so concurrent dispatches are
/// independent.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over a populated registry.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher resolves against.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Resolve, validate, and invoke a call, normalizing the result.
    #[instrument(skip_all, fields(tool = %request.tool_name))]
    pub async fn dispatch(&self, request: CallRequest) -> ResultEnvelope {
        info!("Dispatching tool call: {}", request.tool_name);

        let definition = match self.registry.lookup(&request.tool_name) {
            Ok(definition) => definition,
            Err(err) => {
                warn!("{}", err);
                return ResultEnvelope::failure(METHOD_NOT_FOUND, err.to_string(), request.correlation_id);
            }
        };

        let params = match definition.input_schema().validate(request.params) {
            Ok(params) => params,
            Err(err) => {
                warn!("Validation failed for '{}': {}", request.tool_name, err);
                return ResultEnvelope::failure(INVALID_PARAMS, err.to_string(), request.correlation_id);
            }
        };

        match definition.invoke(params).await {
            Ok(content) => ResultEnvelope::success(content, request.correlation_id),
            Err(err) => {
                error!("Tool '{}' failed: {:#}", request.tool_name, err);
                ResultEnvelope::failure(SERVER_ERROR, err.to_string(), request.correlation_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definition::ToolDefinition;
    use crate::domains::tools::schema::{InputSchema, ParamType};
    use futures::FutureExt;
    use serde_json::json;

    fn params(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    fn test_dispatcher() -> Dispatcher {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "greet",
                "Greet someone by name",
                InputSchema::new().required("name", ParamType::String, "Who to greet"),
                Arc::new(|params| {
                    async move {
                        let name = params.get("name").and_then(|v| v.as_str()).unwrap_or_default();
                        Ok(vec![ToolContent::text(format!("Hello, {}!", name))])
                    }
                    .boxed()
                }),
            ))
            .unwrap();
        registry
            .register(ToolDefinition::new(
                "broken",
                "Always fails unexpectedly",
                InputSchema::new(),
                Arc::new(|_| async { anyhow::bail!("connection reset by peer") }.boxed()),
            ))
            .unwrap();
        Dispatcher::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_dispatch_success_echoes_correlation_id() {
        let dispatcher = test_dispatcher();
        let request = CallRequest::new("greet", params(r#"{"name": "Ada"}"#), Some(json!(7)));

        let envelope = dispatcher.dispatch(request).await;
        assert_eq!(envelope.correlation_id, Some(json!(7)));
        assert_eq!(
            envelope.outcome,
            Outcome::Success {
                content: vec![ToolContent::text("Hello, Ada!")]
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let dispatcher = test_dispatcher();
        let request = CallRequest::new("unknown-tool", params("{}"), Some(json!("r1")));

        let envelope = dispatcher.dispatch(request).await;
        match envelope.outcome {
            Outcome::Failure { code, message } => {
                assert_eq!(code, METHOD_NOT_FOUND);
                assert!(message.contains("Unknown tool: unknown-tool"));
                assert!(message.contains("greet"));
            }
            Outcome::Success { .. } => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_invalid_params() {
        let dispatcher = test_dispatcher();
        let request = CallRequest::new("greet", params(r#"{"name": 42}"#), None);

        let envelope = dispatcher.dispatch(request).await;
        match envelope.outcome {
            Outcome::Failure { code, message } => {
                assert_eq!(code, INVALID_PARAMS);
                assert!(message.contains("'name'"));
            }
            Outcome::Success { .. } => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_handler_error_becomes_server_error() {
        let dispatcher = test_dispatcher();
        let request = CallRequest::new("broken", params("{}"), None);

        let envelope = dispatcher.dispatch(request).await;
        match envelope.outcome {
            Outcome::Failure { code, message } => {
                assert_eq!(code, SERVER_ERROR);
                assert!(message.contains("connection reset"));
            }
            Outcome::Success { .. } => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_is_deterministic() {
        let dispatcher = test_dispatcher();
        let make_request = || CallRequest::new("greet", params(r#"{"name": "Ada"}"#), Some(json!(1)));

        let first = dispatcher.dispatch(make_request()).await;
        let second = dispatcher.dispatch(make_request()).await;
        assert_eq!(first, second);
    }
}
