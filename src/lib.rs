//! Exa CLI client library
//!
//! Routes Exa operations through the hosted Exa MCP endpoint, falling back
//! to the REST API only where no MCP tool is wired (`answer`).

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod mcp;

pub use client::{ClientOutput, ExaClient};
pub use error::{ExaError, Result};
