//! Core trait for secret lookup

/// Read-only source of secrets and required settings
///
/// Implementations:
/// - Environment variables (`EnvSecretStore`)
/// - In-memory for testing (`MemorySecretStore`)
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a value by key. Empty values count as missing.
    fn get(&self, key: &str) -> Option<String>;

    /// Check if a value exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
