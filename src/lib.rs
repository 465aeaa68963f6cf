//! mcp-pool: a configuration-driven MCP client pool.
//!
//! Keeps one live Model Context Protocol client per configured server entry,
//! reconciles the pool against a runtime-changeable configuration source on
//! a timer, and serves consolidated tool listings across every pooled
//! client. Protocol clients and wire transports are supplied by the host
//! through the [`mcp::MCPConnector`] and [`mcp::MCPClient`] seams.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mcp_pool::prelude::*;
//!
//! // Publish server entries under a namespace.
//! let source = Arc::new(StaticConfigSource::from_servers_document(
//!     "mcp",
//!     r#"{"servers": {"weather": {"type": "stdio", "command": "weather-cli", "args": ["--json"]}}}"#,
//! )?);
//!
//! // `connector` is the host's MCPConnector implementation.
//! let pool = MCPClientPool::new(source, connector);
//! pool.refresh().await?;
//!
//! let tools = pool.list_tools().await?;
//! println!("{} tools available", tools.len());
//!
//! pool.dispose().await;
//! ```

pub mod config;
pub mod error;
pub mod mcp;
pub mod prelude;
