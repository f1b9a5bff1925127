//! Transport seam between sessions and MCP servers
//!
//! `RmcpConnector` is the real implementation; `MockConnector` stands in for
//! tool servers in tests.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::address::ServerAddress;
use super::catalog::CatalogItem;
use super::error::McpResult;

/// Textual result of one tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub content: String,
    /// Set when the server reported the call as failed
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// One initialized connection to a tool server
#[async_trait]
pub trait McpConnection: Send + Sync {
    /// Server name reported during the initialize handshake
    fn server_name(&self) -> Option<String>;

    /// Tools, resources, resource templates and prompts the server advertises
    async fn list_catalog(&self) -> McpResult<Vec<CatalogItem>>;

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput>;

    async fn read_resource(&self, uri: &str) -> McpResult<String>;

    async fn get_prompt(&self, name: &str, arguments: Option<Map<String, Value>>) -> McpResult<String>;

    /// Release the transport
    async fn close(&mut self) -> McpResult<()>;
}

/// Opens connections to tool servers
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish the transport and complete the initialize handshake
    async fn connect(&self, address: &ServerAddress) -> McpResult<Box<dyn McpConnection>>;
}
