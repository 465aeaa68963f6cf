//! Convenience re-exports for common use.

pub use crate::config::{
    read_descriptors, ConfigSource, ServerDescriptor, ServerKind, StaticConfigSource,
};
pub use crate::error::{PoolError, Result};
pub use crate::mcp::{
    MCPClient, MCPClientPool, MCPClientPoolOptions, MCPConnector, MCPServerTools, MCPToolSchema,
    MCPTransportRecipe,
};
