//! Model Context Protocol (MCP) client pooling.
//!
//! The pool keeps one live client per configured server, reconciles the set
//! against the configuration source on a timer, and serves consolidated tool
//! listings across every pooled client. Protocol clients and their wire
//! transports are host-supplied through the [`MCPConnector`] and
//! [`MCPClient`] seams; this module owns lifecycle, not framing.

pub mod client;
pub mod pool;
pub mod schema;
pub mod transport;

pub use client::MCPClient;
pub use pool::{MCPClientPool, MCPClientPoolOptions};
pub use schema::{MCPServerTools, MCPToolSchema};
pub use transport::{MCPConnector, MCPTransportRecipe};
