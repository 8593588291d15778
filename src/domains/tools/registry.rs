//! Tool Registry - central registration and lookup for all tools.
//!
//! The registry maps tool names to their definitions. It is populated once
//! during startup, before the server begins accepting requests, and is
//! read-only afterwards, so concurrent dispatches can share it without
//! locking.

use std::collections::HashMap;

use tracing::debug;

use super::ToolError;
use super::definition::ToolDefinition;

/// Tool registry - owns all registered tool definitions.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool definition.
    ///
    /// Fails if a tool with the same name is already registered.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<(), ToolError> {
        let name = definition.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::duplicate(name));
        }
        debug!("Registered tool: {}", name);
        self.tools.insert(name, definition);
        Ok(())
    }

    /// Look up a tool definition by name.
    pub fn lookup(&self, name: &str) -> Result<&ToolDefinition, ToolError> {
        self.tools
            .get(name)
            .ok_or_else(|| ToolError::unknown(name, &self.names()))
    }

    /// All registered tool names, sorted for deterministic output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Metadata for every registered tool, sorted by name.
    pub fn list_metadata(&self) -> Vec<serde_json::Value> {
        let mut definitions: Vec<&ToolDefinition> = self.tools.values().collect();
        definitions.sort_by(|a, b| a.name().cmp(b.name()));
        definitions.into_iter().map(ToolDefinition::to_metadata).collect()
    }
}
