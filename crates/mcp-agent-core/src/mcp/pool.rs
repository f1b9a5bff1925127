//! Request-scoped pool of tool server sessions
//!
//! The pool is the single owner of its sessions. It:
//! - Opens sessions in the supplied order
//! - Aggregates their catalogs, tagged by source
//! - Routes tool calls to a specific session
//! - Closes every session it holds

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logging::Logger;

use super::address::ServerAddress;
use super::catalog::SourcedItem;
use super::connection::{Connector, ToolOutput};
use super::error::{McpError, McpResult};
use super::session::ToolServerSession;

/// What `open_all` does when one address fails to open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenFailurePolicy {
    /// Stop at the first failure and report it
    #[default]
    Abort,
    /// Log the failure and continue with the remaining addresses
    Skip,
}

/// Routes tool calls to the session that advertised the tool
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(&self, source: usize, name: &str, arguments: Value) -> McpResult<ToolOutput>;
}

/// Sessions opened for one request
pub struct SessionPool {
    connector: Arc<dyn Connector>,
    /// Only sessions that opened successfully, in open order
    sessions: Vec<ToolServerSession>,
    logger: Arc<dyn Logger>,
}

impl SessionPool {
    pub fn new(connector: Arc<dyn Connector>, logger: Arc<dyn Logger>) -> Self {
        Self {
            connector,
            sessions: Vec::new(),
            logger,
        }
    }

    /// Open a session per address, in order
    ///
    /// Under `Abort`, the first failure is returned and the pool keeps the
    /// sessions opened before it; the caller still owes them a `close_all`.
    pub async fn open_all(&mut self, addresses: &[ServerAddress], policy: OpenFailurePolicy) -> McpResult<()> {
        for address in addresses {
            let index = self.sessions.len();
            match ToolServerSession::open(
                self.connector.as_ref(),
                address.clone(),
                index,
                Arc::clone(&self.logger),
            )
            .await
            {
                Ok(session) => self.sessions.push(session),
                Err(e) => match policy {
                    OpenFailurePolicy::Abort => {
                        self.logger.error(&format!(
                            "[SessionPool] Failed to open {}: {} ({} session(s) already open)",
                            address,
                            e,
                            self.sessions.len()
                        ));
                        return Err(e);
                    }
                    OpenFailurePolicy::Skip => {
                        self.logger.warn(&format!("[SessionPool] Skipping {}: {}", address, e));
                    }
                },
            }
        }

        self.logger.info(&format!(
            "[SessionPool] {} of {} session(s) open",
            self.sessions.len(),
            addresses.len()
        ));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sessions(&self) -> &[ToolServerSession] {
        &self.sessions
    }

    /// Concatenated catalogs in pool order; no deduplication or renaming
    pub async fn aggregated_tools(&mut self, use_cache: bool) -> McpResult<Vec<SourcedItem>> {
        let mut items = Vec::new();
        for session in &mut self.sessions {
            let tag = session.tag();
            for item in session.list_tools(use_cache).await? {
                items.push(SourcedItem {
                    source: tag.clone(),
                    item,
                });
            }
        }

        self.logger.info(&format!(
            "[SessionPool] Aggregated {} catalog item(s) from {} session(s)",
            items.len(),
            self.sessions.len()
        ));
        Ok(items)
    }

    /// Close every session. Failures are logged by the sessions themselves.
    pub async fn close_all(mut self) {
        for session in &mut self.sessions {
            session.close().await;
        }
        self.logger.debug(&format!("[SessionPool] Closed {} session(s)", self.sessions.len()));
    }
}

#[async_trait]
impl ToolInvoker for SessionPool {
    async fn invoke(&self, source: usize, name: &str, arguments: Value) -> McpResult<ToolOutput> {
        let session = self
            .sessions
            .get(source)
            .ok_or_else(|| McpError::ToolCallFailed(format!("no session #{} for {}", source, name)))?;
        self.logger.info(&format!("[SessionPool] Calling {} on {}", name, session.label()));
        session.invoke(name, arguments).await
    }
}
