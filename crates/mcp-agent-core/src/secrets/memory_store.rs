//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::SecretStore;

/// In-memory secret store for tests and embedded use
///
/// # Example
///
/// ```
/// use mcp_agent_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.insert("AZURE_OPENAI_KEY", "test-key");
/// assert_eq!(store.get("AZURE_OPENAI_KEY"), Some("test-key".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store from key/value pairs
    pub fn with_secrets<K, V>(initial: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            secrets: RwLock::new(
                initial
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Insert or replace a value
    pub fn insert(&self, key: &str, value: &str) {
        self.secrets.write().insert(key.to_string(), value.to_string());
    }

    /// Remove a value
    pub fn remove(&self, key: &str) {
        self.secrets.write().remove(key);
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.secrets
            .read()
            .get(key)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_insert_remove() {
        let store = MemorySecretStore::new();
        assert!(!store.has("AZURE_OPENAI_ENDPOINT"));

        store.insert("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com");
        assert!(store.has("AZURE_OPENAI_ENDPOINT"));

        store.remove("AZURE_OPENAI_ENDPOINT");
        assert!(!store.has("AZURE_OPENAI_ENDPOINT"));
    }

    #[test]
    fn test_memory_store_empty_value_is_missing() {
        let store = MemorySecretStore::with_secrets([("AZURE_OPENAI_KEY", "")]);
        assert_eq!(store.get("AZURE_OPENAI_KEY"), None);
    }
}
