use anyhow::Result;
use clap::Parser;
use polarion_mcp::McpServer;

mod api;
mod config;

use config::{AppState, Args, ServerConfig, Transport};

const DEFAULT_LOG_FILTER: &str = "polarion=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = ServerConfig::load(args)?;

    tracing::info!("Starting Polarion MCP server");
    tracing::info!("Polarion instance: {}", config.base_url);
    tracing::info!("Token directory: {}", config.token_dir.display());

    let state = AppState::new(&config).await?;

    match config.transport {
        Transport::Stdio => {
            McpServer::new(state.registry.clone()).run().await?;
        }
        Transport::Http => {
            let addr = config.bind_addr();
            tracing::info!("Starting HTTP transport on {}", addr);
            api::serve(&addr, state).await?;
        }
    }

    Ok(())
}

/// Logs always go to stderr; stdout belongs to the stdio transport.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}
