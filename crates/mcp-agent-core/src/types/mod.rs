//! Core types for agent interactions
//!
//! Shared between the providers, the MCP session layer and the agent loop.

mod message;
mod tool;
mod stream;
mod cancellation;

pub use message::{ChatMessage, ContentPart, MessageRole, MessageContent};
pub use tool::{Tool, ToolCall, ToolResult};
pub use stream::StreamChunk;
pub use cancellation::CancellationToken;
