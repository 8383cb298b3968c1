//! MCP transport and result handling

pub mod render;
pub mod transport;
pub mod types;

pub use render::render;
pub use transport::{McpConnection, McpSession};
pub use types::{ContentBlock, ResourceContents, ToolOutcome};
