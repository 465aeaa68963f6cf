//! Configuration sources and the descriptor reader.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::warn;

use super::{parse_servers_document, ServerDescriptor};

/// An opaque key/value configuration store.
///
/// The pool only needs two things from its configuration: the raw JSON blobs
/// currently published under a namespace, and an optional refresh hook that
/// lets the source re-read its backing data before a reconciliation pass.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Enumerate `(key, raw JSON)` children under a namespace.
    ///
    /// Order is whatever the source yields; an empty or unknown namespace
    /// returns an empty sequence, not a failure.
    async fn list_children(&self, namespace: &str) -> Vec<(String, String)>;

    /// Re-read backing data. Called at the start of each reconciliation pass.
    async fn refresh(&self) {}
}

/// Read every descriptor currently published under a namespace.
///
/// Each child is parsed independently; malformed entries are logged and
/// skipped rather than failing the read. Source order is preserved.
pub async fn read_descriptors(source: &dyn ConfigSource, namespace: &str) -> Vec<ServerDescriptor> {
    let mut descriptors = Vec::new();

    for (key, raw) in source.list_children(namespace).await {
        match ServerDescriptor::from_json_str(&raw) {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(error) => {
                warn!(entry = %key, error = %error, "skipping malformed MCP server entry");
            }
        }
    }

    descriptors
}

/// In-memory [`ConfigSource`] over a replaceable snapshot of entries.
///
/// Hosts swap the whole snapshot to model runtime configuration changes;
/// readers always observe one complete snapshot or the next.
#[derive(Default)]
pub struct StaticConfigSource {
    children: RwLock<HashMap<String, Vec<(String, String)>>>,
}

impl StaticConfigSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source with one namespace pre-populated.
    pub fn with_children(namespace: impl Into<String>, entries: Vec<(String, String)>) -> Self {
        let source = Self::new();
        source.set_children(namespace, entries);
        source
    }

    /// Create a source from a whole-document configuration.
    ///
    /// Parses `{"servers": {...}}` and publishes one child per server, with
    /// the descriptor's wire form (name embedded) as the raw value.
    pub fn from_servers_document(
        namespace: impl Into<String>,
        json: &str,
    ) -> crate::error::Result<Self> {
        let entries = parse_servers_document(json)?
            .into_iter()
            .map(|descriptor| (descriptor.name.clone(), descriptor.to_json_string()))
            .collect();
        Ok(Self::with_children(namespace, entries))
    }

    /// Replace the snapshot for a namespace.
    pub fn set_children(&self, namespace: impl Into<String>, entries: Vec<(String, String)>) {
        self.children
            .write()
            .unwrap()
            .insert(namespace.into(), entries);
    }

    /// Remove every entry under a namespace.
    pub fn clear_children(&self, namespace: &str) {
        self.children.write().unwrap().remove(namespace);
    }
}

#[async_trait]
impl ConfigSource for StaticConfigSource {
    async fn list_children(&self, namespace: &str) -> Vec<(String, String)> {
        self.children
            .read()
            .unwrap()
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }
}
