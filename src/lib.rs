//! Tax & Weather Tool Server Library
//!
//! This crate provides an HTTP server exposing callable tools (sales tax
//! calculation, weather lookup) through a JSON-RPC-style protocol, with
//! single-shot responses and server-sent-event streaming.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, error handling,
//!   the main server, and the HTTP/SSE transport
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: the tool registry, input validation, dispatch, and the
//!     tool definitions themselves
//!
//! # Example
//!
//! ```rust,no_run
//! use tax_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
