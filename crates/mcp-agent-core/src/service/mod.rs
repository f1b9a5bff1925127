//! Request-level orchestration
//!
//! One `handle` call is one request: a fresh pool is opened, its catalog
//! aggregated, the agent run against it, and the pool closed on every path.
//! If the returned future is dropped part way, the sessions close themselves
//! in the background.

mod error;

pub use error::{ServiceError, ServiceResult};

use std::sync::Arc;

use crate::agent::{Agent, AgentError, AgentOutcome};
use crate::config::{AppConfig, PoolSettings};
use crate::logging::Logger;
use crate::mcp::{Connector, ServerAddress, SessionPool};
use crate::providers::Provider;
use crate::types::CancellationToken;

/// Parse caller-supplied server addresses
///
/// Stdio addresses spawn local processes, so they are refused unless
/// `allow_stdio` is set.
pub fn parse_addresses<S: AsRef<str>>(links: &[S], allow_stdio: bool) -> ServiceResult<Vec<ServerAddress>> {
    links
        .iter()
        .map(|link| {
            let address = ServerAddress::parse(link.as_ref())
                .map_err(|e| ServiceError::InvalidAddress(e.to_string()))?;
            if address.is_stdio() && !allow_stdio {
                return Err(ServiceError::InvalidAddress(format!(
                    "stdio servers are disabled: {}",
                    address
                )));
            }
            Ok(address)
        })
        .collect()
}

/// Runs the agent against a per-request session pool
pub struct AgentService {
    agent: Agent,
    connector: Arc<dyn Connector>,
    pool: PoolSettings,
    logger: Arc<dyn Logger>,
}

impl AgentService {
    pub fn new(agent: Agent, connector: Arc<dyn Connector>, pool: PoolSettings, logger: Arc<dyn Logger>) -> Self {
        Self {
            agent,
            connector,
            pool,
            logger,
        }
    }

    /// Service for a loaded configuration
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        connector: Arc<dyn Connector>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let agent = Agent::from_settings(
            &config.agent,
            config.model.to_model_config(),
            provider,
            Arc::clone(&logger),
        );
        Self::new(agent, connector, config.pool.clone(), logger)
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Handle one user request against the given tool servers
    pub async fn handle(
        &self,
        user_input: &str,
        addresses: &[ServerAddress],
        cancel: CancellationToken,
    ) -> ServiceResult<AgentOutcome> {
        self.logger.info(&format!(
            "[AgentService] Request with {} server(s)",
            addresses.len()
        ));

        let mut pool = SessionPool::new(Arc::clone(&self.connector), Arc::clone(&self.logger));
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ServiceError::Agent(AgentError::Cancelled)),
            result = self.run_in_pool(&mut pool, user_input, addresses, cancel.clone()) => result,
        };
        pool.close_all().await;

        if let Err(e) = &result {
            self.logger.error(&format!("[AgentService] Request failed: {}", e));
        }
        result
    }

    async fn run_in_pool(
        &self,
        pool: &mut SessionPool,
        user_input: &str,
        addresses: &[ServerAddress],
        cancel: CancellationToken,
    ) -> ServiceResult<AgentOutcome> {
        pool.open_all(addresses, self.pool.on_open_failure)
            .await
            .map_err(ServiceError::Connection)?;

        let catalog = pool
            .aggregated_tools(self.pool.cache_tools)
            .await
            .map_err(ServiceError::Catalog)?;

        Ok(self.agent.run(user_input, &catalog, &*pool, cancel).await?)
    }
}
