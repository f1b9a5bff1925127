//! LLM Provider implementations
//!
//! All real back ends go through the `genai` crate, which handles streaming
//! SSE parsing, provider protocols and tool calling. Azure OpenAI, OpenRouter
//! and Mistral are reached through their OpenAI-compatible endpoints.
//!
//! The `MockProvider` is kept for tests and local runs.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
pub use error::{ProviderError, ProviderResult};

pub use genai_provider::GenaiProvider;
pub use genai_adapter::{azure_v1_base, is_genai_native, is_genai_supported};

pub use mock::{MockProvider, MockMode, MockTurn};

use crate::logging::Logger;
use std::sync::Arc;

/// Create a provider for the given provider ID
///
/// `mock` yields an echoing `MockProvider`; everything else goes to
/// `GenaiProvider`, which treats unknown ids as OpenAI-compatible.
pub fn create_provider(provider_id: &str, logger: Arc<dyn Logger>) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::echo(logger)),
        id => Arc::new(GenaiProvider::new(id, logger)),
    }
}

/// List all supported provider IDs
pub fn supported_providers() -> Vec<&'static str> {
    vec![
        "azure",
        "openai",
        "anthropic",
        "gemini",
        "ollama",
        "groq",
        "xai",
        "deepseek",
        "cohere",
        "fireworks",
        "together",
        "openrouter",
        "mistral",
        "mock",
    ]
}
