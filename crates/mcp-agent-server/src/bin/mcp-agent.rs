//! Interactive front end: one question against one or more tool servers

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use mcp_agent_core::service::parse_addresses;
use mcp_agent_core::{
    create_provider, AgentService, AppConfig, CancellationToken, EnvSecretStore, RmcpConnector,
    SharedLogger, TracingLogger,
};
use mcp_agent_server::init_tracing;

#[derive(Parser, Debug)]
#[command(author, version, about = "Ask the MCP agent a question", long_about = None)]
struct Args {
    /// Tool server address: a command line or an http(s) URL. Repeatable.
    #[arg(short, long = "server", default_value = "python mcpdemo.py")]
    servers: Vec<String>,

    /// Question to ask; read from stdin when omitted
    #[arg(short, long)]
    input: Option<String>,

    /// Path to the settings file (YAML)
    #[arg(short, long, env = "MCP_AGENT_CONFIG")]
    config: Option<PathBuf>,
}

async fn prompt_for_input() -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter your query: ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = AppConfig::from_env(&EnvSecretStore::new(), args.config.as_deref())?;
    config.pool.cache_tools = true;

    let input = match args.input {
        Some(input) => input,
        None => prompt_for_input().await?,
    };
    if input.is_empty() {
        bail!("no query given");
    }

    let addresses = parse_addresses(&args.servers, true)?;

    let logger: SharedLogger = Arc::new(TracingLogger::with_component("mcp-agent-cli"));
    let provider = create_provider(&config.model.provider, Arc::clone(&logger));
    let connector = Arc::new(RmcpConnector::new(Arc::clone(&logger)).with_credentials(&config.credentials_path));
    let service = AgentService::from_config(&config, provider, connector, logger);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let outcome = service.handle(&input, &addresses, cancel).await?;
    println!("{}", outcome.text);
    Ok(())
}
