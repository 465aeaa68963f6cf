//! Error types for the client pool.

use thiserror::Error;

/// Primary error type for all pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// A configuration entry could not be parsed into a server descriptor.
    #[error("Configuration parse error: {0}")]
    Parse(String),

    /// A descriptor names a server kind the transport factory cannot build.
    #[error("Unsupported server kind: {0}")]
    UnsupportedKind(String),

    /// Establishing a client connection failed.
    #[error("Connection failed for '{server}': {message}")]
    Connect { server: String, message: String },

    /// A targeted operation named a server that is not currently pooled.
    #[error("Server not found in pool: {0}")]
    ServerNotFound(String),

    /// A routed tool invocation failed or returned an error payload.
    #[error("Tool call failed on '{server}' for '{tool}': {message}")]
    ToolCall {
        server: String,
        tool: String,
        message: String,
    },

    /// Operation attempted after the pool was torn down.
    #[error("Client pool has been disposed")]
    Disposed,

    /// A reconciliation pass was cancelled before completing.
    #[error("Reconciliation cancelled: {0}")]
    Cancelled(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PoolError {
    /// Create a connect failure for a named server.
    pub fn connect(server: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a tool call failure for a named server and tool.
    pub fn tool_call(
        server: impl Into<String>,
        tool: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ToolCall {
            server: server.into(),
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether the failure is expected to clear on a later reconciliation pass.
    ///
    /// Connect failures and cancelled passes are retried by the next scheduled
    /// refresh; everything else requires a configuration or caller change.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Cancelled(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, PoolError>;
