//! Adapter between our types and genai types
//!
//! Conversion functions in both directions plus client construction. Auth
//! always comes from the explicit key in the model binding (loaded once at
//! startup), never from genai's own env var lookup.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatStreamEvent, MessageContent as GenaiContent, Tool as GenaiTool,
    ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};

use crate::types::{
    ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool, ToolCall,
};

use super::error::ProviderError;
use super::traits::{ProviderModelConfig, StreamChatOptions};

// ============================================================================
// Message Conversion: ours -> genai
// ============================================================================

fn text_message(role: MessageRole, text: String) -> GenaiMessage {
    let content = GenaiContent::from(text);
    match role {
        MessageRole::System => GenaiMessage::system(content),
        MessageRole::User => GenaiMessage::user(content),
        MessageRole::Assistant => GenaiMessage::assistant(content),
    }
}

/// Convert one ChatMessage into genai messages
///
/// A tool-use turn becomes one assistant tool-call message; each tool result
/// becomes its own tool-response message, as the chat-completions protocol
/// expects one response per call id.
pub fn to_genai_message(msg: ChatMessage) -> Vec<GenaiMessage> {
    let parts = match msg.content {
        MessageContent::Text(text) => return vec![text_message(msg.role, text)],
        MessageContent::Parts(parts) => parts,
    };

    let mut out = Vec::new();
    let mut text = Vec::new();
    let mut calls = Vec::new();

    for part in parts {
        match part {
            ContentPart::Text { text: t } => text.push(t),
            ContentPart::ToolUse { id, name, input } => calls.push(GenaiToolCall {
                call_id: id,
                fn_name: name,
                fn_arguments: input,
                thought_signatures: None,
            }),
            ContentPart::ToolResult { tool_use_id, content } => {
                out.push(GenaiMessage::from(GenaiToolResponse::new(tool_use_id, content)));
            }
        }
    }

    if !text.is_empty() {
        out.insert(0, text_message(msg.role, text.join("\n")));
    }
    if !calls.is_empty() {
        out.push(GenaiMessage::from(calls));
    }
    out
}

/// Convert a conversation to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().flat_map(to_genai_message).collect()
}

// ============================================================================
// Tool Conversion: ours -> genai
// ============================================================================

/// Convert Tool to genai Tool
pub fn to_genai_tool(tool: Tool) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(&tool.name).with_description(&tool.description);

    if let Some(schema) = tool.input_schema {
        genai_tool = genai_tool.with_schema(schema);
    }

    genai_tool
}

/// Convert tools to genai tools
pub fn to_genai_tools(tools: Vec<Tool>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion: ours -> genai
// ============================================================================

/// Convert StreamChatOptions to genai ChatOptions
pub fn to_genai_options(options: &StreamChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // Tool calls are only surfaced through the captured End event
    genai_opts.with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> ours
// ============================================================================

/// Convert genai ToolCall to our ToolCall
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall {
        id: tc.call_id.clone(),
        name: tc.fn_name.clone(),
        input: tc.fn_arguments.clone(),
    }
}

/// Convert a genai stream event to zero or more chunks
///
/// Partial tool-call chunks are dropped; the complete calls arrive with the
/// End event, all of them, in the order the model produced them.
pub fn from_genai_event(event: ChatStreamEvent) -> Vec<Result<StreamChunk, ProviderError>> {
    match event {
        ChatStreamEvent::Chunk(chunk) => vec![Ok(StreamChunk::Text {
            text: chunk.content,
        })],
        ChatStreamEvent::End(end) => end
            .captured_tool_calls()
            .map(|calls| {
                calls
                    .iter()
                    .map(|tc| Ok(StreamChunk::tool_call(from_genai_tool_call(tc))))
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Client Creation
// ============================================================================

/// Provider routing configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider identifier (e.g., "azure", "openai", "ollama")
    pub provider: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl ProviderConfig {
    /// Routing config for a provider and model binding
    pub fn new(provider: impl Into<String>, model: &ProviderModelConfig) -> Self {
        Self {
            provider: provider.into(),
            api_key: model.api_key.clone(),
            api_base: model.api_base.clone(),
        }
    }
}

/// OpenAI-compatible base URL of an Azure OpenAI resource
///
/// `https://res.openai.azure.com` becomes `https://res.openai.azure.com/openai/v1/`.
/// A base that already points at `/openai/v1` is kept as is.
pub fn azure_v1_base(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if trimmed.ends_with("/openai/v1") {
        format!("{}/", trimmed)
    } else {
        format!("{}/openai/v1/", trimmed)
    }
}

/// Create a genai Client with explicit auth and endpoint resolution
pub fn create_client(config: &ProviderConfig) -> Client {
    let auth_key = config.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = auth_key.clone();
            // None lets keyless back ends (ollama) through
            Box::pin(async move { Ok(key.map(AuthData::from_single)) })
        }
    );

    let target_provider = config.provider.to_lowercase();
    let target_api_base = config.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { ref model, .. } = target;

            let (endpoint, adapter_kind): (Endpoint, AdapterKind) = match target_provider.as_str() {
                "azure" => {
                    let base = target_api_base
                        .as_deref()
                        .map(azure_v1_base)
                        .unwrap_or_else(|| "https://your-resource.openai.azure.com/openai/v1/".to_string());
                    (Endpoint::from_owned(base), AdapterKind::OpenAI)
                }
                "openrouter" => (
                    Endpoint::from_static("https://openrouter.ai/api/v1/"),
                    AdapterKind::OpenAI,
                ),
                "mistral" => (
                    Endpoint::from_static("https://api.mistral.ai/v1/"),
                    AdapterKind::OpenAI,
                ),
                // Native genai providers: honour a custom base if one was given
                _ => match target_api_base.as_ref() {
                    Some(base) => (Endpoint::from_owned(base.clone()), model.adapter_kind),
                    None => return Ok(target),
                },
            };

            let resolved_model = ModelIden::new(adapter_kind, model.model_name.clone());

            Ok(ServiceTarget {
                endpoint,
                auth: target.auth,
                model: resolved_model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

/// Check if a provider is natively supported by genai
pub fn is_genai_native(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai"
            | "anthropic"
            | "gemini"
            | "ollama"
            | "groq"
            | "xai"
            | "deepseek"
            | "cohere"
            | "fireworks"
            | "together"
    )
}

/// Check if a provider can be handled by genai (native or via OpenAI-compat)
pub fn is_genai_supported(provider: &str) -> bool {
    is_genai_native(provider)
        || matches!(
            provider.to_lowercase().as_str(),
            "azure" | "openrouter" | "mistral"
        )
}
