//! Process configuration
//!
//! Built once at startup and shared by reference:
//! - required values (model endpoint, credentials) come from a `SecretStore`
//! - optional tuning comes from a YAML settings file

mod error;
mod file;
mod app;

pub use error::{ConfigError, ConfigResult};
pub use file::{SettingsFile, AgentSettings, PoolSettings, ServerSettings};
pub use app::{AppConfig, ModelSettings, env_keys};
