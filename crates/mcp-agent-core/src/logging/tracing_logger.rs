//! Logger that forwards to `tracing`

use super::traits::Logger;

/// Forwards every message to the `tracing` macros under a fixed target
///
/// The binaries install a `tracing-subscriber` fmt layer, so filtering is
/// controlled with `RUST_LOG` (e.g. `RUST_LOG=mcp_agent=debug`).
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: String,
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl TracingLogger {
    /// Create a tracing logger with the default component name
    pub fn new() -> Self {
        Self {
            component: "mcp-agent".to_string(),
        }
    }

    /// Create a tracing logger tagged with a custom component name
    pub fn with_component(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "mcp_agent", component = %self.component, "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(target: "mcp_agent", component = %self.component, "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "mcp_agent", component = %self.component, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "mcp_agent", component = %self.component, "{}", message);
    }
}
