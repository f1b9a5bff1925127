//! GenaiProvider - unified provider using the genai crate
//!
//! Handles all genai-native providers as well as Azure OpenAI, OpenRouter and
//! Mistral through their OpenAI-compatible endpoints.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::Arc;

use genai::chat::{ChatRequest, ChatStreamEvent};

use crate::logging::Logger;
use crate::types::{CancellationToken, ChatMessage};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_event, is_genai_supported, to_genai_messages, to_genai_options,
    to_genai_tools, ProviderConfig,
};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};

/// Unified provider using genai for all supported LLM APIs
pub struct GenaiProvider {
    /// Provider identifier
    provider_id: String,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    /// Create a new GenaiProvider
    pub fn new(provider_id: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider_id: provider_id.into(),
            logger,
        }
    }

    /// Check if this provider can handle the given provider ID
    pub fn supports(provider_id: &str) -> bool {
        is_genai_supported(provider_id)
    }

    /// Extract model name from a model string (e.g., "openai/gpt-4o" -> "gpt-4o")
    pub fn extract_model_name(model: &str) -> &str {
        model.split('/').nth(1).unwrap_or(model)
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    fn default_api_base(&self) -> &str {
        match self.provider_id.as_str() {
            "openai" => "https://api.openai.com/v1/",
            "anthropic" => "https://api.anthropic.com/",
            "gemini" => "https://generativelanguage.googleapis.com/",
            "ollama" => "http://localhost:11434/",
            "groq" => "https://api.groq.com/openai/v1/",
            "openrouter" => "https://openrouter.ai/api/v1/",
            "mistral" => "https://api.mistral.ai/v1/",
            "azure" => "https://your-resource.openai.azure.com/openai/v1/",
            _ => "https://api.openai.com/v1/",
        }
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        let model_name = Self::extract_model_name(&model_config.model).to_string();
        self.logger.info(&format!(
            "[GenaiProvider] stream_chat: provider={}, model={}, messages={}, tools={}",
            self.provider_id,
            model_name,
            messages.len(),
            options.tools.as_ref().map(|t| t.len()).unwrap_or(0)
        ));

        if model_config.api_key.is_none() && self.provider_id != "ollama" {
            return Err(ProviderError::missing_api_key(&self.provider_id));
        }

        let client = create_client(&ProviderConfig::new(&self.provider_id, &model_config));

        let mut chat_req = ChatRequest::new(to_genai_messages(messages));
        if let Some(tools) = &options.tools {
            chat_req = chat_req.with_tools(to_genai_tools(tools.clone()));
        }

        let genai_options = to_genai_options(&options);

        let chat_stream = client
            .exec_chat_stream(&model_name, chat_req, Some(&genai_options))
            .await
            .map_err(|e| ProviderError::api_error(&self.provider_id, 500, e.to_string()))?;

        self.logger.debug("[GenaiProvider] Stream started");

        let logger = Arc::clone(&self.logger);
        let provider_id = self.provider_id.clone();

        let chunks = chat_stream
            .stream
            .map(move |result| {
                if cancel_token.is_cancelled() {
                    logger.info("[GenaiProvider] Stream cancelled");
                    return vec![Err(ProviderError::Cancelled)];
                }

                match result {
                    Ok(event) => {
                        if let ChatStreamEvent::End(_) = &event {
                            logger.debug("[GenaiProvider] Stream event: End");
                        }
                        from_genai_event(event)
                    }
                    Err(e) => {
                        logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                        vec![Err(ProviderError::api_error(&provider_id, 500, e.to_string()))]
                    }
                }
            })
            .flat_map(stream::iter);

        Ok(Box::pin(chunks))
    }
}
