//! Error types for Exa client operations

use thiserror::Error;

/// Errors that can occur while routing an Exa operation
#[derive(Error, Debug)]
pub enum ExaError {
    /// Opening the MCP transport to the endpoint failed
    #[error("failed to connect to MCP endpoint: {0}")]
    Connection(String),

    /// The endpoint does not advertise the requested tool
    #[error("tool '{0}' is not available on the MCP endpoint (check the tools allowlist)")]
    ToolUnavailable(String),

    /// The tool ran but reported failure (`isError` on the result)
    #[error("tool execution failed: {0}")]
    ToolExecution(String),

    /// The requested option has no MCP representation
    #[error("option not supported over MCP: {0}")]
    UnsupportedOption(String),

    /// The endpoint override is not a valid URL
    #[error("invalid MCP endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// An in-flight MCP request failed at the protocol level
    #[error("MCP request failed: {0}")]
    Rpc(#[from] rmcp::ServiceError),

    /// A tool result or API response did not match the expected wire shape
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The direct REST request failed
    #[error("exa api request failed: {0}")]
    Api(#[from] reqwest::Error),

    /// The REST API returned a non-success status
    #[error("exa api error {status}: {body}")]
    ApiStatus { status: u16, body: String },
}

/// Result type alias for Exa client operations
pub type Result<T> = std::result::Result<T, ExaError>;
