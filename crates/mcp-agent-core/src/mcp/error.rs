//! MCP error types

use thiserror::Error;

/// MCP session errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("Session is closed: {0}")]
    SessionClosed(String),
}

pub type McpResult<T> = Result<T, McpError>;
