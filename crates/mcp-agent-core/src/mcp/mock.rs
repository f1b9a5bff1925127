//! Mock tool servers for testing
//!
//! Servers are registered under an address string. The connector records
//! every open, close, listing and tool call so tests can check teardown.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::address::ServerAddress;
use super::catalog::CatalogItem;
use super::connection::{Connector, McpConnection, ToolOutput};
use super::error::{McpError, McpResult};

/// Scripted tool server
#[derive(Debug, Clone, Default)]
pub struct MockServer {
    name: String,
    catalog: Vec<CatalogItem>,
    responses: HashMap<String, ToolOutput>,
    resources: HashMap<String, String>,
    prompts: HashMap<String, String>,
    fail_open: bool,
    hang_open: bool,
    fail_list: bool,
    fail_close: bool,
}

impl MockServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Advertise a tool
    pub fn with_tool(mut self, name: &str, description: &str, input_schema: Value) -> Self {
        self.catalog.push(CatalogItem::tool(name, description, input_schema));
        self
    }

    /// Text returned when `tool` is called
    pub fn with_response(mut self, tool: &str, text: &str) -> Self {
        self.responses.insert(tool.to_string(), ToolOutput::text(text));
        self
    }

    /// Error result returned when `tool` is called
    pub fn with_error_response(mut self, tool: &str, text: &str) -> Self {
        self.responses.insert(tool.to_string(), ToolOutput::error(text));
        self
    }

    pub fn with_resource(mut self, uri: &str, text: &str) -> Self {
        self.catalog.push(CatalogItem::Resource {
            uri: uri.to_string(),
            name: uri.to_string(),
            description: None,
            mime_type: Some("text/plain".to_string()),
            templated: uri.contains('{'),
        });
        self.resources.insert(uri.to_string(), text.to_string());
        self
    }

    /// Prompt template rendering to `text` with `{arg}` placeholders filled in
    pub fn with_prompt(mut self, name: &str, text: &str) -> Self {
        self.catalog.push(CatalogItem::Prompt {
            name: name.to_string(),
            description: None,
            arguments: Vec::new(),
        });
        self.prompts.insert(name.to_string(), text.to_string());
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Handshake that never completes
    pub fn hanging_open(mut self) -> Self {
        self.hang_open = true;
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

/// One recorded tool call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub address: String,
    pub tool: String,
    pub arguments: Value,
}

#[derive(Debug, Default)]
struct Journal {
    opened: Vec<String>,
    closed: Vec<String>,
    listings: Vec<String>,
    calls: Vec<RecordedCall>,
}

/// Connector serving `MockServer`s by address
#[derive(Default)]
pub struct MockConnector {
    servers: HashMap<String, Arc<MockServer>>,
    journal: Arc<Mutex<Journal>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a server under an address string such as `python notes.py`
    pub fn with_server(mut self, address: &str, server: MockServer) -> Self {
        let key = ServerAddress::parse(address)
            .map(|a| a.to_string())
            .unwrap_or_else(|_| address.to_string());
        self.servers.insert(key, Arc::new(server));
        self
    }

    /// Addresses successfully opened, in order
    pub fn opened(&self) -> Vec<String> {
        self.journal.lock().opened.clone()
    }

    /// Addresses closed, in order
    pub fn closed(&self) -> Vec<String> {
        self.journal.lock().closed.clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.journal.lock().calls.clone()
    }

    /// Catalog round trips made against `address`
    pub fn list_count(&self, address: &str) -> usize {
        self.journal
            .lock()
            .listings
            .iter()
            .filter(|a| a.as_str() == address)
            .count()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, address: &ServerAddress) -> McpResult<Box<dyn McpConnection>> {
        let key = address.to_string();
        let server = self
            .servers
            .get(&key)
            .ok_or_else(|| McpError::ConnectionFailed(format!("no server at {}", key)))?;

        if server.hang_open {
            std::future::pending::<()>().await;
        }
        if server.fail_open {
            return Err(McpError::InitializationFailed(format!("{} refused handshake", key)));
        }

        self.journal.lock().opened.push(key.clone());
        Ok(Box::new(MockConnection {
            address: key,
            server: Arc::clone(server),
            journal: Arc::clone(&self.journal),
            open: true,
        }))
    }
}

struct MockConnection {
    address: String,
    server: Arc<MockServer>,
    journal: Arc<Mutex<Journal>>,
    open: bool,
}

impl MockConnection {
    fn ensure_open(&self) -> McpResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(McpError::SessionClosed(self.address.clone()))
        }
    }
}

#[async_trait]
impl McpConnection for MockConnection {
    fn server_name(&self) -> Option<String> {
        Some(self.server.name.clone())
    }

    async fn list_catalog(&self) -> McpResult<Vec<CatalogItem>> {
        self.ensure_open()?;
        self.journal.lock().listings.push(self.address.clone());
        if self.server.fail_list {
            return Err(McpError::Protocol("listing failed".to_string()));
        }
        Ok(self.server.catalog.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput> {
        self.ensure_open()?;
        self.journal.lock().calls.push(RecordedCall {
            address: self.address.clone(),
            tool: name.to_string(),
            arguments,
        });

        if let Some(output) = self.server.responses.get(name) {
            return Ok(output.clone());
        }
        if self.server.catalog.iter().any(|i| i.is_tool() && i.name() == name) {
            return Ok(ToolOutput::text(format!("{} ok", name)));
        }
        Err(McpError::ToolCallFailed(format!("unknown tool: {}", name)))
    }

    async fn read_resource(&self, uri: &str) -> McpResult<String> {
        self.ensure_open()?;
        self.server
            .resources
            .get(uri)
            .cloned()
            .ok_or_else(|| McpError::Protocol(format!("resource not found: {}", uri)))
    }

    async fn get_prompt(&self, name: &str, arguments: Option<Map<String, Value>>) -> McpResult<String> {
        self.ensure_open()?;
        let template = self
            .server
            .prompts
            .get(name)
            .ok_or_else(|| McpError::Protocol(format!("prompt not found: {}", name)))?;

        let mut text = template.clone();
        for (key, value) in arguments.unwrap_or_default() {
            let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
            text = text.replace(&format!("{{{}}}", key), &value);
        }
        Ok(text)
    }

    async fn close(&mut self) -> McpResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.journal.lock().closed.push(self.address.clone());
        if self.server.fail_close {
            return Err(McpError::Protocol(format!("{} hung up badly", self.address)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_address_fails() {
        let connector = MockConnector::new();
        let result = connector.connect(&ServerAddress::http("http://nowhere/mcp")).await;
        assert!(matches!(result, Err(McpError::ConnectionFailed(_))));
        assert!(connector.opened().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_rendering() {
        let connector = MockConnector::new().with_server(
            "python notes.py",
            MockServer::new("notes").with_prompt("summarize_notes", "Resume las notas de {user_id}"),
        );
        let connection = connector
            .connect(&ServerAddress::parse("python notes.py").unwrap())
            .await
            .unwrap();

        let args = json!({"user_id": "u-1"}).as_object().cloned();
        let text = connection.get_prompt("summarize_notes", args).await.unwrap();
        assert_eq!(text, "Resume las notas de u-1");
    }
}
