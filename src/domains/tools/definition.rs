//! Tool definitions.
//!
//! A [`ToolDefinition`] binds a tool name to its description, input schema,
//! and async handler. Definitions are created once at startup when they are
//! registered and are immutable afterwards.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::{Map, Value, json};

/// A single item of tool output content.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolContent {
    /// Content type; currently always `"text"`.
    #[serde(rename = "type")]
    pub content_type: String,

    /// The content text.
    pub text: String,
}

impl ToolContent {
    /// Create a text content item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Handler signature: validated params in, ordered content out.
///
/// Domain-expected conditions (unknown jurisdiction, city not found) are
/// reported as `Ok` content with explanatory text so a calling agent sees
/// them as normal tool output. An `Err` means something unexpected happened
/// (e.g. a network failure) and is converted to a protocol error at the
/// dispatch boundary.
pub type ToolHandler =
    Arc<dyn Fn(Map<String, Value>) -> BoxFuture<'static, anyhow::Result<Vec<ToolContent>>> + Send + Sync>;

/// A registered tool: name, description, input schema, and handler.
#[derive(Clone)]
pub struct ToolDefinition {
    name: String,
    description: String,
    input_schema: super::schema::InputSchema,
    handler: ToolHandler,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: super::schema::InputSchema,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            handler,
        }
    }

    /// The tool's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The tool's human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The tool's declared input schema.
    pub fn input_schema(&self) -> &super::schema::InputSchema {
        &self.input_schema
    }

    /// Invoke the handler with validated params.
    pub async fn invoke(&self, params: Map<String, Value>) -> anyhow::Result<Vec<ToolContent>> {
        (self.handler)(params).await
    }

    /// Tool metadata for listings.
    pub fn to_metadata(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema.to_json(),
        })
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}
