//! One tool server session, scoped to a single request

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::logging::Logger;

use super::address::ServerAddress;
use super::catalog::{CatalogItem, SessionTag};
use super::connection::{Connector, McpConnection, ToolOutput};
use super::error::{McpError, McpResult};

/// Open connection to one tool server plus its cached catalog
///
/// A session is created open and moves to closed exactly once, through
/// `close` or, if the owner never got that far, through `Drop`.
pub struct ToolServerSession {
    index: usize,
    address: ServerAddress,
    label: String,
    /// `None` once closed
    connection: Option<Box<dyn McpConnection>>,
    /// Last successful listing
    catalog: Option<Vec<CatalogItem>>,
    logger: Arc<dyn Logger>,
}

impl ToolServerSession {
    /// Connect and initialize
    pub async fn open(
        connector: &dyn Connector,
        address: ServerAddress,
        index: usize,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!("[Session] Opening #{}: {}", index, address));

        let connection = connector.connect(&address).await?;
        let label = connection
            .server_name()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| address.to_string());

        Ok(Self {
            index,
            address,
            label,
            connection: Some(connection),
            catalog: None,
            logger,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn address(&self) -> &ServerAddress {
        &self.address
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Tag for entries coming from this session
    pub fn tag(&self) -> SessionTag {
        SessionTag {
            index: self.index,
            label: self.label.clone(),
        }
    }

    fn connection(&self) -> McpResult<&dyn McpConnection> {
        self.connection
            .as_deref()
            .ok_or_else(|| McpError::SessionClosed(self.label.clone()))
    }

    /// Advertised catalog
    ///
    /// With `use_cache`, a previous successful listing is returned without a
    /// round trip. A failed listing leaves the cache untouched.
    pub async fn list_tools(&mut self, use_cache: bool) -> McpResult<Vec<CatalogItem>> {
        if use_cache {
            if let Some(cached) = &self.catalog {
                self.logger.debug(&format!("[Session] #{} catalog served from cache", self.index));
                return Ok(cached.clone());
            }
        }

        let items = self.connection()?.list_catalog().await?;
        self.catalog = Some(items.clone());
        Ok(items)
    }

    /// Forward one tool call
    pub async fn invoke(&self, name: &str, arguments: Value) -> McpResult<ToolOutput> {
        let connection = self
            .connection()
            .map_err(|_| McpError::ToolCallFailed(format!("{} on closed session {}", name, self.label)))?;
        self.logger.debug(&format!("[Session] #{} invoke {}", self.index, name));
        connection.call_tool(name, arguments).await
    }

    pub async fn read_resource(&self, uri: &str) -> McpResult<String> {
        self.connection()?.read_resource(uri).await
    }

    /// Render a prompt template
    pub async fn get_prompt(&self, name: &str, arguments: Option<Map<String, Value>>) -> McpResult<String> {
        self.connection()?.get_prompt(name, arguments).await
    }

    /// Release the transport. Idempotent; failures are logged, never returned.
    pub async fn close(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };

        match connection.close().await {
            Ok(()) => self.logger.info(&format!("[Session] Closed #{}: {}", self.index, self.label)),
            Err(e) => self.logger.error(&format!(
                "[Session] Teardown of #{} ({}) failed: {}",
                self.index, self.label, e
            )),
        }
    }
}

impl Drop for ToolServerSession {
    fn drop(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };

        let logger = Arc::clone(&self.logger);
        let label = self.label.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                logger.warn(&format!("[Session] {} dropped while open, closing in background", label));
                handle.spawn(async move {
                    if let Err(e) = connection.close().await {
                        logger.error(&format!("[Session] Teardown of {} failed: {}", label, e));
                    }
                });
            }
            Err(_) => logger.error(&format!("[Session] {} dropped outside a runtime, not closed", label)),
        }
    }
}
