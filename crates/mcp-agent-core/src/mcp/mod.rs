//! MCP (Model Context Protocol) session layer
//!
//! Uses the official rmcp SDK to talk to tool servers over a child process
//! pipe or streamable HTTP. Everything above the transport goes through the
//! `Connector`/`McpConnection` traits so tests can swap in `MockConnector`.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_agent_core::mcp::{RmcpConnector, SessionPool, ServerAddress, OpenFailurePolicy};
//!
//! let connector = Arc::new(RmcpConnector::new(logger.clone()));
//! let mut pool = SessionPool::new(connector, logger);
//!
//! let addresses = vec![ServerAddress::parse("python mcpdemo.py")?];
//! pool.open_all(&addresses, OpenFailurePolicy::Abort).await?;
//!
//! let catalog = pool.aggregated_tools(true).await?;
//! let result = pool.invoke(0, "create_note", json!({"user_id": "u-1"})).await?;
//!
//! pool.close_all().await;
//! ```

mod error;
mod address;
mod catalog;
mod connection;
mod client;
mod session;
mod pool;
pub mod mock;

pub use error::{McpError, McpResult};
pub use address::ServerAddress;
pub use catalog::{CatalogItem, PromptArgument, SessionTag, SourcedItem};
pub use connection::{Connector, McpConnection, ToolOutput};
pub use client::{RmcpConnector, RmcpConnection};
pub use session::ToolServerSession;
pub use pool::{OpenFailurePolicy, SessionPool, ToolInvoker};
pub use mock::{MockConnector, MockServer, RecordedCall};
