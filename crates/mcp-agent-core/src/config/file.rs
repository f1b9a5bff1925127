//! YAML settings file
//!
//! Optional, non-secret tuning. Looked up at `--config`, then `MCP_AGENT_CONFIG`,
//! then `~/.config/mcp-agent/config.yaml`. A missing file yields defaults.
//!
//! ```yaml
//! provider: azure
//! agent:
//!   name: MCP Assistant
//!   max_turns: 10
//! pool:
//!   cache_tools: true
//!   on_open_failure: abort
//! server:
//!   bind: 127.0.0.1:8000
//!   allow_stdio: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::mcp::OpenFailurePolicy;
use super::error::{ConfigError, ConfigResult};

pub const DEFAULT_INSTRUCTIONS: &str = "You are a useful firestore assistant, answer the users queries and do what the user asks of you. Use the provided tools if necessary";

/// Settings file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    /// Model provider id (`azure`, `openai`, `ollama`, ..., `mock`)
    pub provider: Option<String>,
    pub agent: AgentSettings,
    pub pool: PoolSettings,
    pub server: ServerSettings,
}

/// Agent identity and turn budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub name: String,
    pub instructions: String,
    /// Maximum number of model calls in one run
    pub max_turns: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: "MCP Assistant".to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            max_turns: 10,
        }
    }
}

/// Session pool behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Cache each session's catalog after the first successful listing
    pub cache_tools: bool,
    pub on_open_failure: OpenFailurePolicy,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            cache_tools: true,
            on_open_failure: OpenFailurePolicy::Abort,
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    /// Accept stdio (spawn a local command) addresses from HTTP callers
    pub allow_stdio: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            allow_stdio: false,
        }
    }
}

impl SettingsFile {
    /// Default location: ~/.config/mcp-agent/config.yaml
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("mcp-agent").join("config.yaml")
    }

    /// Load settings from a YAML file; a missing file yields defaults
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse settings from YAML text
    pub fn parse(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
