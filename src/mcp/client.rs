//! The opaque protocol client seam.

use async_trait::async_trait;

use crate::error::Result;

use super::schema::MCPToolSchema;

/// A live protocol client owned by the pool.
///
/// Implementations wrap whatever MCP stack the host uses; the pool only
/// relies on this capability set. Methods take `&self` so the pool can share
/// a client between an in-flight query and a concurrent teardown: `close`
/// must be safe to call while another call is still running, and calls after
/// `close` must fail cleanly rather than hang.
#[async_trait]
pub trait MCPClient: Send + Sync {
    /// List the tools this server exposes.
    async fn list_tools(&self) -> Result<Vec<MCPToolSchema>>;

    /// Invoke a tool by name with JSON arguments.
    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value>;

    /// Close the underlying connection.
    async fn close(&self) -> Result<()>;
}
