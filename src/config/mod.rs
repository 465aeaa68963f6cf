//! Server descriptors and the configuration parser.
//!
//! A descriptor is the parsed, validated record describing one MCP server's
//! connection parameters. The wire form is a JSON object with a required
//! `name` and `type`, plus kind-specific fields (`command`/`args` for stdio,
//! `url` for sse). Parsing is tolerant: kind-specific fields fall back to
//! empty defaults and non-string `args` elements are dropped, matching the
//! forgiving shape of hand-edited server configuration files.

pub mod source;

pub use source::{read_descriptors, ConfigSource, StaticConfigSource};

use std::fmt;

use serde_json::Value;

use crate::error::{PoolError, Result};

/// Kind of transport a server descriptor requests.
///
/// Kind literals are compared case-insensitively ("SSE" and "sse" are the
/// same kind). Unrecognized literals are preserved verbatim in `Unknown` so
/// the transport factory can reject them with the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerKind {
    /// A streamable HTTP/SSE server reached over the network.
    Sse,
    /// A local subprocess speaking MCP over stdio.
    Stdio,
    /// An unrecognized kind literal, kept verbatim.
    Unknown(String),
}

impl ServerKind {
    /// Parse a kind literal from configuration.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "sse" => Self::Sse,
            "stdio" => Self::Stdio,
            _ => Self::Unknown(raw.to_owned()),
        }
    }

    /// The canonical wire literal for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sse => "sse",
            Self::Stdio => "stdio",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable connection parameters for one MCP server.
///
/// Server names are case-insensitive identities: two descriptors whose names
/// differ only in case address the same pool entry (see [`Self::pool_key`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    /// Unique server name, as written in configuration.
    pub name: String,
    /// Requested transport kind.
    pub kind: ServerKind,
    /// Endpoint URL; populated only for [`ServerKind::Sse`].
    pub endpoint: String,
    /// Command to launch; populated only for [`ServerKind::Stdio`].
    pub command: String,
    /// Ordered command arguments; populated only for [`ServerKind::Stdio`].
    pub args: Vec<String>,
}

impl ServerDescriptor {
    /// Parse a descriptor from one raw JSON blob.
    ///
    /// Requires `name` and `type`. Kind-specific fields default when absent
    /// or mistyped: `command` to the empty string, `args` to an empty list
    /// (non-string elements dropped), `url` to the empty string.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json_value(&value)
    }

    /// Parse a descriptor from an already-decoded JSON value.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| PoolError::Parse("server entry must be a JSON object".into()))?;

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| PoolError::Parse("missing required field `name`".into()))?;

        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .map(ServerKind::parse)
            .ok_or_else(|| {
                PoolError::Parse(format!("missing required field `type` for server '{name}'"))
            })?;

        Ok(Self::from_fields(name, kind, object))
    }

    fn from_fields(name: &str, kind: ServerKind, object: &serde_json::Map<String, Value>) -> Self {
        let mut descriptor = Self {
            name: name.to_owned(),
            kind,
            endpoint: String::new(),
            command: String::new(),
            args: Vec::new(),
        };

        match descriptor.kind {
            ServerKind::Stdio => {
                descriptor.command = object
                    .get("command")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                descriptor.args = object
                    .get("args")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_owned)
                            .collect()
                    })
                    .unwrap_or_default();
            }
            ServerKind::Sse => {
                descriptor.endpoint = object
                    .get("url")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
            }
            ServerKind::Unknown(_) => {}
        }

        descriptor
    }

    /// Case-insensitive identity used to key the pool.
    pub fn pool_key(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Emit the wire form of this descriptor.
    ///
    /// Round-trips through [`Self::from_json_str`] for known kinds.
    pub fn to_json_string(&self) -> String {
        let mut object = serde_json::Map::new();
        object.insert("name".into(), Value::String(self.name.clone()));
        object.insert("type".into(), Value::String(self.kind.as_str().to_owned()));

        match self.kind {
            ServerKind::Stdio => {
                object.insert("command".into(), Value::String(self.command.clone()));
                object.insert(
                    "args".into(),
                    Value::Array(self.args.iter().cloned().map(Value::String).collect()),
                );
            }
            ServerKind::Sse => {
                object.insert("url".into(), Value::String(self.endpoint.clone()));
            }
            ServerKind::Unknown(_) => {}
        }

        Value::Object(object).to_string()
    }
}

/// Parse every server from a whole-document configuration.
///
/// The document form is `{"servers": {"<name>": {...}}}` with the map key
/// supplying each server's name. A document without a `servers` property
/// yields no descriptors; non-object children are skipped and a child with
/// no `type` gets an unknown kind rather than failing the document.
pub fn parse_servers_document(json: &str) -> Result<Vec<ServerDescriptor>> {
    let document: Value = serde_json::from_str(json)?;

    let Some(servers) = document.get("servers").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let mut descriptors = Vec::new();
    for (name, entry) in servers {
        let Some(object) = entry.as_object() else {
            tracing::warn!(server = %name, "skipping non-object server entry");
            continue;
        };

        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .map(ServerKind::parse)
            .unwrap_or_else(|| ServerKind::Unknown("unknown".into()));

        descriptors.push(ServerDescriptor::from_fields(name, kind, object));
    }

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_stdio_descriptor() {
        let raw = json!({
            "name": "weather",
            "type": "stdio",
            "command": "weather-cli",
            "args": ["--json"]
        })
        .to_string();

        let descriptor = ServerDescriptor::from_json_str(&raw).unwrap();
        assert_eq!(descriptor.name, "weather");
        assert_eq!(descriptor.kind, ServerKind::Stdio);
        assert_eq!(descriptor.command, "weather-cli");
        assert_eq!(descriptor.args, vec!["--json"]);
        assert_eq!(descriptor.endpoint, "");
    }

    #[test]
    fn parses_sse_descriptor() {
        let raw = json!({
            "name": "docs",
            "type": "sse",
            "url": "https://mcp.example.com/mcp"
        })
        .to_string();

        let descriptor = ServerDescriptor::from_json_str(&raw).unwrap();
        assert_eq!(descriptor.kind, ServerKind::Sse);
        assert_eq!(descriptor.endpoint, "https://mcp.example.com/mcp");
        assert_eq!(descriptor.command, "");
        assert!(descriptor.args.is_empty());
    }

    #[test]
    fn kind_literal_is_case_insensitive() {
        let raw = json!({"name": "docs", "type": "SSE", "url": "https://x"}).to_string();
        let descriptor = ServerDescriptor::from_json_str(&raw).unwrap();
        assert_eq!(descriptor.kind, ServerKind::Sse);
    }

    #[test]
    fn unknown_kind_is_preserved_verbatim() {
        let raw = json!({"name": "exotic", "type": "WebSocket"}).to_string();
        let descriptor = ServerDescriptor::from_json_str(&raw).unwrap();
        assert_eq!(descriptor.kind, ServerKind::Unknown("WebSocket".into()));
        assert_eq!(descriptor.kind.as_str(), "WebSocket");
    }

    #[test]
    fn stdio_fields_default_when_absent() {
        let raw = json!({"name": "bare", "type": "stdio"}).to_string();
        let descriptor = ServerDescriptor::from_json_str(&raw).unwrap();
        assert_eq!(descriptor.command, "");
        assert!(descriptor.args.is_empty());
    }

    #[test]
    fn non_string_args_are_dropped() {
        let raw = json!({
            "name": "mixed",
            "type": "stdio",
            "command": "run",
            "args": ["--ok", 42, null, "--also-ok", {"nested": true}]
        })
        .to_string();

        let descriptor = ServerDescriptor::from_json_str(&raw).unwrap();
        assert_eq!(descriptor.args, vec!["--ok", "--also-ok"]);
    }

    #[test]
    fn missing_name_is_rejected() {
        let raw = json!({"type": "stdio", "command": "run"}).to_string();
        let err = ServerDescriptor::from_json_str(&raw).unwrap_err();
        assert!(matches!(err, PoolError::Parse(message) if message.contains("name")));
    }

    #[test]
    fn missing_type_is_rejected() {
        let raw = json!({"name": "weather"}).to_string();
        let err = ServerDescriptor::from_json_str(&raw).unwrap_err();
        assert!(matches!(err, PoolError::Parse(message) if message.contains("type")));
    }

    #[test]
    fn non_object_entry_is_rejected() {
        let err = ServerDescriptor::from_json_str("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, PoolError::Parse(_)));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = ServerDescriptor::from_json_str(r#"{"name": "oops""#).unwrap_err();
        assert!(matches!(err, PoolError::Serialization(_)));
    }

    #[test]
    fn pool_key_is_case_insensitive() {
        let raw = json!({"name": "Weather", "type": "stdio"}).to_string();
        let descriptor = ServerDescriptor::from_json_str(&raw).unwrap();
        assert_eq!(descriptor.pool_key(), "weather");
    }

    #[test]
    fn descriptor_round_trips_through_wire_form() {
        let raw = json!({
            "name": "weather",
            "type": "stdio",
            "command": "weather-cli",
            "args": ["--json"]
        })
        .to_string();

        let descriptor = ServerDescriptor::from_json_str(&raw).unwrap();
        let reparsed = ServerDescriptor::from_json_str(&descriptor.to_json_string()).unwrap();
        assert_eq!(descriptor, reparsed);
    }

    #[test]
    fn document_form_takes_names_from_map_keys() {
        let json = json!({
            "servers": {
                "weather": {"type": "stdio", "command": "weather-cli", "args": ["--json"]},
                "docs": {"type": "sse", "url": "https://mcp.example.com/mcp"}
            }
        })
        .to_string();

        let mut descriptors = parse_servers_document(&json).unwrap();
        descriptors.sort_by(|left, right| left.name.cmp(&right.name));

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name, "docs");
        assert_eq!(descriptors[0].kind, ServerKind::Sse);
        assert_eq!(descriptors[1].name, "weather");
        assert_eq!(descriptors[1].command, "weather-cli");
    }

    #[test]
    fn document_form_skips_non_object_children_and_defaults_missing_type() {
        let json = json!({
            "servers": {
                "broken": "not an object",
                "typeless": {"command": "run"}
            }
        })
        .to_string();

        let descriptors = parse_servers_document(&json).unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "typeless");
        assert_eq!(descriptors[0].kind, ServerKind::Unknown("unknown".into()));
    }

    #[test]
    fn document_without_servers_property_is_empty() {
        let descriptors = parse_servers_document(r#"{"other": {}}"#).unwrap();
        assert!(descriptors.is_empty());
    }
}
