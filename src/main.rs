// src/main.rs

use std::env;
use std::net::SocketAddr;

use anyhow::Context;
use tokio::io;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web3_url_gateway::{api, config::Config, mcp, AppState, Web3Client};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("🚀 HTTP Server listening on {}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("HTTP server error")?;
    Ok(())
}

// --- Stdio Tool Server Logic ---
async fn run_mcp_server(state: AppState) {
    info!("🚀 Starting MCP server on stdin/stdout...");
    let stdin = io::BufReader::new(io::stdin());
    mcp::stdio::serve(stdin, io::stdout(), state).await;
    info!("MCP server shutting down");
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays clean for the stdio protocol
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "web3_url_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };
    if !config.chain_overrides.is_empty() {
        info!("RPC overrides configured for chains {:?}", config.overridden_chains());
    }

    let app_state = AppState::new(config, Web3Client::with_rpc());

    // Check if running in MCP mode (stdin/stdout) or HTTP server mode
    let args: Vec<String> = env::args().collect();
    if args.contains(&"--mcp".to_string()) || env::var("MCP_MODE").is_ok() {
        run_mcp_server(app_state).await;
    } else if let Err(e) = run_http_server(app_state).await {
        error!("❌ {:#}", e);
    }
}
