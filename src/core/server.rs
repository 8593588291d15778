//! Server implementation and lifecycle management.
//!
//! The [`McpServer`] assembles the tool registry at startup and exposes the
//! dispatch surface the transport layer consumes. The registry is populated
//! once, before any request is accepted, and never mutated afterwards.

use std::sync::Arc;

use super::config::Config;
use super::error::Result;
use crate::domains::tools::{
    CallRequest, Dispatcher, ResultEnvelope, ToolRegistry, definitions::register_defaults,
};

/// The main server handler.
///
/// Cheap to clone; shared state lives behind `Arc`s.
#[derive(Debug, Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Dispatcher over the startup-populated tool registry.
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a new server with the given configuration.
    ///
    /// Registers all built-in tools; fails if the tool set is
    /// misconfigured (duplicate names).
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let mut registry = ToolRegistry::new();
        register_defaults(&mut registry, &config)?;

        Ok(Self {
            dispatcher: Dispatcher::new(Arc::new(registry)),
            config,
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

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// List metadata for all registered tools.
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.dispatcher.registry().list_metadata()
    }

    /// Dispatch a call request to the matching tool.
    pub async fn dispatch(&self, request: CallRequest) -> ResultEnvelope {
        self.dispatcher.dispatch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::Outcome;

    #[test]
    fn test_server_registers_builtin_tools() {
        let server = McpServer::new(Config::default()).unwrap();
        let tools = server.list_tools();

        let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
        assert_eq!(names, vec!["calculate-tax", "get-weather"]);
    }

    #[tokio::test]
    async fn test_server_dispatches_tax_call() {
        let server = McpServer::new(Config::default()).unwrap();
        let params = serde_json::from_str(r#"{"amount": 100, "jurisdiction": "Texas"}"#).unwrap();

        let envelope = server
            .dispatch(CallRequest::new("calculate-tax", params, None))
            .await;

        match envelope.outcome {
            Outcome::Success { content } => assert!(content[0].text.contains("$6.25")),
            Outcome::Failure { .. } => panic!("expected success"),
        }
    }
}
