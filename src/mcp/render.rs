//! Flattening of tool invocation results into plain text
//!
//! Precedence is fixed: `structuredContent` wins over the legacy
//! `toolResult`, which wins over the content-block list. This function is
//! total; unknown shapes contribute nothing rather than failing.

use serde_json::Value;

use crate::mcp::types::{ContentBlock, ResourceContents, ToolOutcome};

/// Render a tool invocation result as plain text
pub fn render(outcome: &ToolOutcome) -> String {
    if let Some(value) = &outcome.structured_content {
        if !is_empty_value(value) {
            return pretty(value);
        }
    }

    if let Some(value) = &outcome.tool_result {
        return match value {
            Value::String(text) => text.clone(),
            other => pretty(other),
        };
    }

    outcome
        .content
        .iter()
        .filter_map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &ContentBlock) -> Option<String> {
    let text = match block {
        ContentBlock::Text { text } => text.clone(),
        ContentBlock::ResourceLink { uri } => format!("Resource: {uri}"),
        ContentBlock::Resource { resource } => match resource {
            ResourceContents::Text { text, .. } => text.clone(),
            ResourceContents::Blob { uri, .. } => format!("Resource: {uri}"),
        },
        ContentBlock::Image {} => "[image]".to_string(),
        ContentBlock::Audio {} => "[audio]".to_string(),
        ContentBlock::Unknown => String::new(),
    };

    (!text.is_empty()).then_some(text)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// `null` and `{}` count as absent for precedence purposes
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
