//! MCP Agent Core
//!
//! Runtime-agnostic pieces of the MCP agent gateway: the multi-server MCP
//! session lifecycle, LLM providers and the agent loop. The HTTP surface and
//! the CLI live in `mcp-agent-server`.
//!
//! ## Request flow
//!
//! Every request gets its own `SessionPool`. The pool opens one session per
//! tool server, the agent sees the aggregated catalog, and the pool is
//! closed on every exit path.
//!
//! ```rust,ignore
//! use mcp_agent_core::{AgentService, AppConfig, EnvSecretStore, RmcpConnector};
//!
//! let config = AppConfig::from_env(&EnvSecretStore::new(), None)?;
//! let provider = providers::create_provider(&config.model.provider, logger.clone());
//! let connector = Arc::new(RmcpConnector::new(logger.clone()).with_credentials(&config.credentials_path));
//! let service = AgentService::from_config(&config, provider, connector, logger);
//!
//! let addresses = service::parse_addresses(&["python mcpdemo.py"], true)?;
//! let outcome = service.handle("crea una nota", &addresses, CancellationToken::new()).await?;
//! println!("{}", outcome.text);
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod mcp;
pub mod agent;
pub mod service;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageRole, MessageContent,
    Tool, ToolCall, ToolResult,
    StreamChunk,
    CancellationToken,
};

pub use secrets::{SecretStore, EnvSecretStore, MemorySecretStore};

pub use logging::{Logger, SharedLogger, NoOpLogger, TracingLogger};

pub use config::{AppConfig, ConfigError, SettingsFile};

pub use providers::{Provider, ProviderError, MockProvider, GenaiProvider, create_provider};

pub use mcp::{
    CatalogItem, Connector, McpError, McpResult, OpenFailurePolicy, RmcpConnector,
    ServerAddress, SessionPool, SourcedItem, ToolInvoker, ToolServerSession,
};

pub use agent::{Agent, AgentError, AgentOutcome};

pub use service::{AgentService, ServiceError};
