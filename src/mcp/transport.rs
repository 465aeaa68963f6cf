//! Transport recipes and the connector seam.

use async_trait::async_trait;

use crate::config::{ServerDescriptor, ServerKind};
use crate::error::{PoolError, Result};

use super::client::MCPClient;

/// Construction recipe for one server's transport, bound to its name.
///
/// A recipe is pure data: building one opens no connection. The host's
/// [`MCPConnector`] turns a recipe into a live client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MCPTransportRecipe {
    /// Streamable HTTP/SSE transport to a network endpoint.
    Sse { endpoint: String, name: String },
    /// Stdio transport to a spawned subprocess.
    Stdio {
        command: String,
        args: Vec<String>,
        name: String,
    },
}

impl MCPTransportRecipe {
    /// Map a descriptor to its transport recipe.
    ///
    /// Total over [`ServerKind`]: unknown kinds are rejected with
    /// [`PoolError::UnsupportedKind`] carrying the verbatim literal.
    pub fn for_descriptor(descriptor: &ServerDescriptor) -> Result<Self> {
        match &descriptor.kind {
            ServerKind::Sse => Ok(Self::Sse {
                endpoint: descriptor.endpoint.clone(),
                name: descriptor.name.clone(),
            }),
            ServerKind::Stdio => Ok(Self::Stdio {
                command: descriptor.command.clone(),
                args: descriptor.args.clone(),
                name: descriptor.name.clone(),
            }),
            ServerKind::Unknown(raw) => Err(PoolError::UnsupportedKind(raw.clone())),
        }
    }

    /// The server name this recipe is bound to.
    pub fn server_name(&self) -> &str {
        match self {
            Self::Sse { name, .. } | Self::Stdio { name, .. } => name,
        }
    }
}

/// Host-supplied factory that opens live protocol clients.
#[async_trait]
pub trait MCPConnector: Send + Sync {
    /// Establish a client for the given recipe.
    async fn connect(&self, recipe: MCPTransportRecipe) -> Result<Box<dyn MCPClient>>;
}
