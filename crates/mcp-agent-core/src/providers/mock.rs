//! Mock provider for testing
//!
//! Deterministic, scripted responses without network dependencies. The
//! scripted mode plays one `MockTurn` per `stream_chat` call, which is how the
//! agent loop and the request flow are exercised end to end.

use async_trait::async_trait;
use futures::stream;
use parking_lot::Mutex;
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, ProviderModelConfig, StreamChatOptions, StreamResponse};
use crate::logging::Logger;
use crate::types::{
    CancellationToken, ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool,
    ToolCall,
};

/// One scripted model reply
#[derive(Debug, Clone)]
pub enum MockTurn {
    /// Final text answer
    Text(String),
    /// Request these tool calls
    ToolCalls(Vec<ToolCall>),
    /// Fail the request
    Error(String),
    /// Never answer; resolves only once the cancel token fires
    Stall,
}

/// Mock response mode
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Echo back the last user message
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Play these turns in order, one per request
    Script(Vec<MockTurn>),
}

/// Mock LLM provider for testing
pub struct MockProvider {
    mode: MockMode,
    /// Index of the next scripted turn
    cursor: Mutex<usize>,
    /// Tools offered on each request, in call order
    offered: Mutex<Vec<Vec<Tool>>>,
    /// Conversation seen on each request, in call order
    transcripts: Mutex<Vec<Vec<ChatMessage>>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    /// Create a provider with the given mode
    pub fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self {
            mode,
            cursor: Mutex::new(0),
            offered: Mutex::new(Vec::new()),
            transcripts: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    /// Create a fixed response provider
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    /// Create a scripted provider
    pub fn scripted(turns: Vec<MockTurn>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Script(turns), logger)
    }

    /// Number of requests served so far
    pub fn request_count(&self) -> usize {
        self.transcripts.lock().len()
    }

    /// Tools offered on each request
    pub fn offered_tools(&self) -> Vec<Vec<Tool>> {
        self.offered.lock().clone()
    }

    /// Conversations seen on each request
    pub fn transcripts(&self) -> Vec<Vec<ChatMessage>> {
        self.transcripts.lock().clone()
    }

    /// Extract last user text message content
    fn last_user_text(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::User)
            .find_map(|m| match &m.content {
                MessageContent::Text(text) if !text.is_empty() => Some(text.clone()),
                MessageContent::Parts(parts) => {
                    let text: String = parts
                        .iter()
                        .filter_map(|p| match p {
                            ContentPart::Text { text } => Some(text.as_str()),
                            _ => None,
                        })
                        .collect();
                    (!text.is_empty()).then_some(text)
                }
                _ => None,
            })
            .unwrap_or_else(|| "Hello from MockProvider!".to_string())
    }

    fn next_turn(&self, messages: &[ChatMessage]) -> MockTurn {
        match &self.mode {
            MockMode::Echo => MockTurn::Text(format!("Echo: {}", Self::last_user_text(messages))),
            MockMode::Fixed(response) => MockTurn::Text(response.clone()),
            MockMode::Script(turns) => {
                let mut cursor = self.cursor.lock();
                let turn = turns
                    .get(*cursor)
                    .cloned()
                    .unwrap_or_else(|| MockTurn::Error("mock script exhausted".to_string()));
                *cursor += 1;
                turn
            }
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_api_base(&self) -> &str {
        "http://localhost:0/mock"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        _model: ProviderModelConfig,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        self.offered.lock().push(options.tools.clone().unwrap_or_default());
        self.transcripts.lock().push(messages.clone());

        let turn = self.next_turn(&messages);
        self.logger.debug(&format!("[MockProvider] Playing turn: {:?}", turn));

        let chunks: Vec<ProviderResult<StreamChunk>> = match turn {
            MockTurn::Text(text) => vec![Ok(StreamChunk::text(text))],
            MockTurn::ToolCalls(calls) => {
                calls.into_iter().map(|c| Ok(StreamChunk::tool_call(c))).collect()
            }
            MockTurn::Error(message) => {
                return Err(ProviderError::Other(format!("Mock error: {}", message)));
            }
            MockTurn::Stall => {
                cancel_token.cancelled().await;
                return Err(ProviderError::Cancelled);
            }
        };

        Ok(Box::pin(stream::iter(chunks)))
    }
}
