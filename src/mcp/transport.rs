//! One-shot connection to the hosted MCP endpoint
//!
//! Every logical operation opens its own connection, lists tools, makes a
//! single call, and closes. There is no pooling or reuse across calls.

use async_trait::async_trait;
use rmcp::{
    model::CallToolRequestParam, service::RunningService, transport::StreamableHttpClientTransport,
    RoleClient, ServiceExt,
};
use serde_json::Value;

use crate::config::McpEndpoint;
use crate::error::{ExaError, Result};
use crate::mcp::types::ToolOutcome;

/// A live session with an MCP endpoint
///
/// The routing client drives exactly one session per operation. `close`
/// must be called on every exit path before the operation returns.
#[async_trait]
pub trait McpSession: Send {
    /// Names of the tools the endpoint advertises
    async fn list_tools(&self) -> Result<Vec<String>>;

    /// Invoke a named tool with a JSON argument object
    async fn call_tool(&self, name: &str, args: Value) -> Result<ToolOutcome>;

    /// Release the connection
    async fn close(&mut self) -> Result<()>;
}

/// rmcp-backed session over streamable HTTP
pub struct McpConnection {
    service: Option<RunningService<RoleClient, ()>>,
}

impl McpConnection {
    /// Open a connection and complete the MCP handshake
    pub async fn open(endpoint: &McpEndpoint) -> Result<Self> {
        tracing::debug!(
            "Connecting to MCP endpoint: {}",
            endpoint.url().host_str().unwrap_or("<unknown host>")
        );

        let transport = StreamableHttpClientTransport::from_uri(endpoint.as_str().to_string());
        let service = ()
            .serve(transport)
            .await
            .map_err(|e| ExaError::Connection(e.to_string()))?;

        Ok(Self {
            service: Some(service),
        })
    }

    fn service(&self) -> Result<&RunningService<RoleClient, ()>> {
        self.service
            .as_ref()
            .ok_or_else(|| ExaError::Connection("connection already closed".to_string()))
    }
}

#[async_trait]
impl McpSession for McpConnection {
    async fn list_tools(&self) -> Result<Vec<String>> {
        let response = self.service()?.list_tools(Default::default()).await?;
        Ok(response
            .tools
            .into_iter()
            .map(|t| t.name.to_string())
            .collect())
    }

    async fn call_tool(&self, name: &str, args: Value) -> Result<ToolOutcome> {
        tracing::debug!("Calling MCP tool: {}", name);

        let arguments = args.as_object().cloned();
        let result = self
            .service()?
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments,
                task: None,
            })
            .await?;

        Ok(ToolOutcome::try_from(result)?)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(service) = self.service.take() {
            service
                .cancel()
                .await
                .map_err(|e| ExaError::Connection(e.to_string()))?;
        }
        Ok(())
    }
}
