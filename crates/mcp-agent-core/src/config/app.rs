//! Startup configuration assembled from the secret store and settings file

use std::path::{Path, PathBuf};

use crate::providers::ProviderModelConfig;
use crate::secrets::SecretStore;

use super::error::{ConfigError, ConfigResult};
use super::file::{AgentSettings, PoolSettings, ServerSettings, SettingsFile};

/// Environment keys read at startup
pub mod env_keys {
    pub const ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
    pub const API_KEY: &str = "AZURE_OPENAI_KEY";
    pub const API_VERSION: &str = "AZURE_OPENAI_VERSION";
    pub const DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT_4O_MINI";
    pub const CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
    /// Optional override for the settings file location
    pub const SETTINGS_PATH: &str = "MCP_AGENT_CONFIG";
}

/// Model binding: which provider, where, and with which deployment
#[derive(Clone, PartialEq)]
pub struct ModelSettings {
    pub provider: String,
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    /// Deployment (Azure) or model name
    pub deployment: String,
}

impl std::fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSettings")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("deployment", &self.deployment)
            .finish()
    }
}

impl ModelSettings {
    /// Provider request config for this binding
    pub fn to_model_config(&self) -> ProviderModelConfig {
        ProviderModelConfig::new(self.deployment.clone())
            .with_api_key(self.api_key.clone())
            .with_api_base(self.endpoint.clone())
            .with_api_version(self.api_version.clone())
    }
}

/// Full process configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model: ModelSettings,
    /// Document-store credentials handed to spawned tool provider processes
    pub credentials_path: PathBuf,
    pub agent: AgentSettings,
    pub pool: PoolSettings,
    pub server: ServerSettings,
}

impl AppConfig {
    /// Build the configuration. Missing required values are fatal.
    ///
    /// With the `mock` provider the model values are optional, so the
    /// gateway can run locally without an LLM account.
    pub fn load(store: &dyn SecretStore, settings: SettingsFile) -> ConfigResult<Self> {
        let provider = settings
            .provider
            .clone()
            .unwrap_or_else(|| "azure".to_string())
            .to_lowercase();
        let optional_model = provider == "mock";

        let read = |key: &str| -> ConfigResult<String> {
            match store.get(key) {
                Some(value) => Ok(value.trim().to_string()),
                None if optional_model => Ok(String::new()),
                None => Err(ConfigError::MissingVariable(key.to_string())),
            }
        };

        let model = ModelSettings {
            endpoint: read(env_keys::ENDPOINT)?,
            api_key: read(env_keys::API_KEY)?,
            api_version: read(env_keys::API_VERSION)?,
            deployment: read(env_keys::DEPLOYMENT)?,
            provider,
        };

        let credentials_path = store
            .get(env_keys::CREDENTIALS)
            .map(PathBuf::from)
            .ok_or_else(|| ConfigError::MissingVariable(env_keys::CREDENTIALS.to_string()))?;

        if settings.agent.max_turns == 0 {
            return Err(ConfigError::InvalidValue {
                key: "agent.max_turns".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            model,
            credentials_path,
            agent: settings.agent,
            pool: settings.pool,
            server: settings.server,
        })
    }

    /// Load from the process environment plus the settings file at `path`
    /// (or `MCP_AGENT_CONFIG`, or the default location)
    pub fn from_env(store: &dyn SecretStore, path: Option<&Path>) -> ConfigResult<Self> {
        let settings_path = match path {
            Some(p) => p.to_path_buf(),
            None => store
                .get(env_keys::SETTINGS_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(SettingsFile::default_path),
        };
        let settings = SettingsFile::load(&settings_path)?;
        Self::load(store, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::OpenFailurePolicy;
    use crate::secrets::MemorySecretStore;

    fn full_store() -> MemorySecretStore {
        MemorySecretStore::with_secrets([
            (env_keys::ENDPOINT, "https://notes.openai.azure.com"),
            (env_keys::API_KEY, "secret-key"),
            (env_keys::API_VERSION, "2024-10-21"),
            (env_keys::DEPLOYMENT, "gpt-4o-mini"),
            (env_keys::CREDENTIALS, "/etc/firebase/service-account.json"),
        ])
    }

    #[test]
    fn test_load_complete_config() {
        let config = AppConfig::load(&full_store(), SettingsFile::default()).unwrap();
        assert_eq!(config.model.provider, "azure");
        assert_eq!(config.model.deployment, "gpt-4o-mini");
        assert_eq!(
            config.credentials_path,
            PathBuf::from("/etc/firebase/service-account.json")
        );
        assert_eq!(config.pool.on_open_failure, OpenFailurePolicy::Abort);

        let model = config.model.to_model_config();
        assert_eq!(model.model, "gpt-4o-mini");
        assert_eq!(model.api_key.as_deref(), Some("secret-key"));
        assert_eq!(model.api_version.as_deref(), Some("2024-10-21"));
    }

    #[test]
    fn test_missing_value_is_fatal() {
        for key in [
            env_keys::ENDPOINT,
            env_keys::API_KEY,
            env_keys::API_VERSION,
            env_keys::DEPLOYMENT,
            env_keys::CREDENTIALS,
        ] {
            let store = full_store();
            store.remove(key);
            match AppConfig::load(&store, SettingsFile::default()) {
                Err(ConfigError::MissingVariable(missing)) => assert_eq!(missing, key),
                other => panic!("expected MissingVariable({key}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_mock_provider_relaxes_model_values() {
        let store = MemorySecretStore::with_secrets([(env_keys::CREDENTIALS, "/tmp/creds.json")]);
        let settings = SettingsFile {
            provider: Some("mock".to_string()),
            ..Default::default()
        };
        let config = AppConfig::load(&store, settings).unwrap();
        assert_eq!(config.model.provider, "mock");
        assert!(config.model.api_key.is_empty());
    }

    #[test]
    fn test_zero_turn_budget_rejected() {
        let mut settings = SettingsFile::default();
        settings.agent.max_turns = 0;
        assert!(matches!(
            AppConfig::load(&full_store(), settings),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AppConfig::load(&full_store(), SettingsFile::default()).unwrap();
        let debug = format!("{:?}", config.model);
        assert!(!debug.contains("secret-key"));
    }
}
