use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use mcp_agent_core::{
    create_provider, AgentService, AppConfig, EnvSecretStore, RmcpConnector, SharedLogger, TracingLogger,
};
use mcp_agent_server::{init_tracing, serve, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about = "HTTP gateway running an MCP agent per request", long_about = None)]
struct Args {
    /// Path to the settings file (YAML)
    #[arg(short, long, env = "MCP_AGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (overrides the settings file)
    #[arg(long, env = "MCP_AGENT_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = AppConfig::from_env(&EnvSecretStore::new(), args.config.as_deref())?;
    tracing::info!("Configuration: {:#?}", config);

    let logger: SharedLogger = Arc::new(TracingLogger::new());
    let provider = create_provider(&config.model.provider, Arc::clone(&logger));
    let connector = Arc::new(RmcpConnector::new(Arc::clone(&logger)).with_credentials(&config.credentials_path));
    let service = AgentService::from_config(&config, provider, connector, logger);

    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    serve(AppState::new(service, config.server.allow_stdio), &bind).await
}
