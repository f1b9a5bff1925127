//! Agent error types

use thiserror::Error;

use crate::providers::ProviderError;

/// Errors that end an agent run
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model call or stream failed
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// Turn budget used up while the model kept calling tools
    #[error("Exceeded {0} turns without a final answer")]
    MaxTurnsExceeded(usize),

    #[error("Agent run cancelled")]
    Cancelled,
}

impl From<ProviderError> for AgentError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Cancelled => Self::Cancelled,
            other => Self::Provider(other),
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
