//! Service error types

use thiserror::Error;

use crate::agent::AgentError;
use crate::mcp::McpError;

/// Why a request failed
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A tool server could not be opened
    #[error("Connection error: {0}")]
    Connection(McpError),

    /// A tool server failed to list its catalog
    #[error("Catalog error: {0}")]
    Catalog(McpError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Caller supplied an unusable or disallowed address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl ServiceError {
    /// Whether the caller, not the gateway, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidAddress(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
