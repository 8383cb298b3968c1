//! Wire types for MCP tool invocation results
//!
//! These mirror the JSON shapes a tool call can return over the protocol:
//! a list of content blocks, an optional `structuredContent` value, the
//! legacy `toolResult` field from older servers, and the `isError` flag.
//! The rmcp model is converted through its JSON serialization so the wire
//! shape, not the SDK's in-memory model, is the contract here.

use rmcp::model::CallToolResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One unit of a tool's response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text { text: String },
    /// Link to a resource by URI
    ResourceLink { uri: String },
    /// Resource embedded in the response
    Resource { resource: ResourceContents },
    /// Image payload (rendered as a placeholder)
    Image {},
    /// Audio payload (rendered as a placeholder)
    Audio {},
    /// Any block type this client does not recognize
    #[serde(other)]
    Unknown,
}

/// Payload of an embedded resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceContents {
    Text { uri: String, text: String },
    Blob { uri: String, blob: String },
}

/// Result of a single tool invocation
///
/// Exactly one of `structured_content`, `tool_result`, or the block list
/// drives the textual rendering; see [`crate::mcp::render`] for the fixed
/// precedence. `is_error` can accompany any of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutcome {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl TryFrom<CallToolResult> for ToolOutcome {
    type Error = serde_json::Error;

    fn try_from(result: CallToolResult) -> Result<Self, Self::Error> {
        serde_json::from_value(serde_json::to_value(result)?)
    }
}
