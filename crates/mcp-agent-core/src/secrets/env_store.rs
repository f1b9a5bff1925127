//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::SecretStore;

/// Fallback variable names accepted for the canonical keys
static ENV_ALIASES: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("AZURE_OPENAI_KEY", vec!["AZURE_OPENAI_API_KEY", "AZURE_API_KEY"]);
    m.insert("AZURE_OPENAI_VERSION", vec!["OPENAI_API_VERSION"]);
    m.insert("AZURE_OPENAI_DEPLOYMENT_4O_MINI", vec!["AZURE_OPENAI_DEPLOYMENT"]);
    m
});

/// Secret store that reads from environment variables
///
/// Keys are looked up as-is first, then through the alias table, so
/// `AZURE_OPENAI_KEY` is also satisfied by `AZURE_OPENAI_API_KEY`.
///
/// # Example
///
/// ```
/// use mcp_agent_core::secrets::{SecretStore, EnvSecretStore};
///
/// let store = EnvSecretStore::new();
/// let endpoint = store.get("AZURE_OPENAI_ENDPOINT");
/// ```
#[derive(Debug, Default)]
pub struct EnvSecretStore {
    _private: (),
}

impl EnvSecretStore {
    /// Create a new environment variable secret store
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Fallback variable names for a key
    pub fn aliases_for(key: &str) -> &'static [&'static str] {
        ENV_ALIASES.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn read(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        Self::read(key).or_else(|| Self::aliases_for(key).iter().find_map(|alias| Self::read(alias)))
    }
}
