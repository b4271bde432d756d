mod config;
mod http;
mod service;
mod tools;

use anyhow::Context as _;
use clap::Parser as _;
use config::{Config, LogFormat};
use qradar_client::QRadarClient;
use qradar_discovery::EndpointCache;
use rmcp::ServiceExt as _;
use service::QRadarMcp;
use tools::QRadarTools;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::parse();
    init_tracing(&cfg)?;

    let qradar = cfg.qradar_config();
    if qradar.host.is_empty() {
        warn!("QRADAR_HOST is not set; tool calls must pass qradar_host");
    }
    if qradar.api_token.is_empty() {
        warn!("QRADAR_API_TOKEN is not set; tool calls must pass qradar_token");
    }
    info!(config = ?qradar, "qradar console");

    let client = QRadarClient::new(qradar).context("build QRadar client")?;
    let mcp = QRadarMcp::new(QRadarTools::new(client, EndpointCache::new()));

    if cfg.stdio {
        run_stdio(mcp).await
    } else {
        run_http(mcp, &cfg).await
    }
}

fn init_tracing(cfg: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log_level))
        .context("parse log filter")?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match cfg.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))
}

async fn run_stdio(mcp: QRadarMcp) -> anyhow::Result<()> {
    info!(tools = mcp.tool_descriptors().len(), "qradar mcp server [stdio]");
    let running = mcp
        .serve(rmcp::transport::stdio())
        .await
        .context("start MCP stdio session")?;
    let reason = running.waiting().await.context("MCP stdio session")?;
    info!(?reason, "stdio session closed");
    Ok(())
}

async fn run_http(mcp: QRadarMcp, cfg: &Config) -> anyhow::Result<()> {
    let addr = cfg.bind_addr();
    let auth_required = cfg.api_key().is_some();
    info!(
        %addr,
        tools = mcp.tool_descriptors().len(),
        auth_required,
        "qradar mcp server [http]"
    );
    if !auth_required {
        warn!("MCP_API_KEY is not set; HTTP routes are unauthenticated");
    }

    let app = http::router(mcp, cfg.api_key().map(str::to_string));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve http")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
