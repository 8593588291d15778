//! Tool-specific error types.

use thiserror::Error;

pub use super::schema::ValidationError;

/// Errors that can occur during tool registration and lookup.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A tool with the same name is already registered.
    #[error("tool '{0}' is already registered")]
    Duplicate(String),

    /// The requested tool is not registered.
    #[error("Unknown tool: {name}, supported: {supported}")]
    Unknown {
        /// The name the caller asked for.
        name: String,
        /// Comma-separated sorted list of registered tool names.
        supported: String,
    },
}

impl ToolError {
    /// Create a new "duplicate tool" error.
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::Duplicate(name.into())
    }

    /// Create a new "unknown tool" error carrying the supported-names list.
    pub fn unknown(name: impl Into<String>, names: &[String]) -> Self {
        Self::Unknown {
            name: name.into(),
            supported: names.join(", "),
        }
    }
}
