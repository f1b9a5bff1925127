//! Catalog entries advertised by tool servers

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Tool;

/// Argument accepted by a prompt template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// One thing a tool server exposes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogItem {
    /// Callable function
    Tool {
        name: String,
        description: String,
        #[serde(rename = "inputSchema")]
        input_schema: Value,
    },
    /// Readable resource; `templated` marks URI templates such as `notes://{id}`
    Resource {
        uri: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
        #[serde(default)]
        templated: bool,
    },
    /// Prompt template, rendered on request and never executed
    Prompt {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default)]
        arguments: Vec<PromptArgument>,
    },
}

impl CatalogItem {
    /// Tool entry with an object schema
    pub fn tool(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self::Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Tool { name, .. } | Self::Resource { name, .. } | Self::Prompt { name, .. } => name,
        }
    }

    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Tool { .. })
    }

    /// Model-facing definition, for tool entries only
    pub fn as_tool(&self) -> Option<Tool> {
        match self {
            Self::Tool {
                name,
                description,
                input_schema,
            } => Some(Tool::new(name.clone(), description.clone()).with_schema(input_schema.clone())),
            _ => None,
        }
    }
}

/// Which pooled session an entry came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTag {
    /// Position of the session in its pool
    pub index: usize,
    /// Server name reported at initialization, or the address
    pub label: String,
}

/// Catalog entry tagged with its originating session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedItem {
    pub source: SessionTag,
    pub item: CatalogItem,
}
