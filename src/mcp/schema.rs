//! MCP capability schema types.

use serde::{Deserialize, Serialize};

/// Schema for a tool exposed by an MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MCPToolSchema {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: serde_json::Value,
}

/// One server's contribution to a consolidated tool listing.
///
/// The listing itself is ephemeral: it is derived from whatever clients are
/// pooled at query time and carries no identity beyond that query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPServerTools {
    /// Name of the server the tools came from.
    pub server: String,
    pub tools: Vec<MCPToolSchema>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_schema_parses_wire_form() {
        let json = r#"{
            "name": "query-docs",
            "description": "Query documentation",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string" }
                }
            }
        }"#;

        let tool: MCPToolSchema = serde_json::from_str(json).unwrap();
        assert_eq!(tool.name, "query-docs");
        assert_eq!(tool.description.as_deref(), Some("Query documentation"));
        assert_eq!(tool.input_schema["type"], "object");
    }

    #[test]
    fn tool_schema_serializes_camel_case() {
        let tool = MCPToolSchema {
            name: "echo".into(),
            description: None,
            input_schema: serde_json::json!({"type": "object"}),
        };

        let value = serde_json::to_value(&tool).unwrap();
        assert!(value.get("inputSchema").is_some());
    }
}
