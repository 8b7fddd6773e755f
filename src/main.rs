use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use airdrop_board::config;
use airdrop_board::http::{self, AppState, Backend};
use airdrop_board::notion::NotionClient;
use airdrop_board::service::AirdropService;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;

    let backend = match cfg.notion_credentials() {
        Ok(creds) => {
            let client = NotionClient::from_credentials(&creds)?;
            info!(root_page_id = %creds.root_page_id, "notion backend ready");
            Backend::Ready(Arc::new(AirdropService::from_credentials(
                Arc::new(client),
                &creds,
            )))
        }
        Err(err) => {
            warn!(%err, "notion is not configured; only the status endpoint will be useful");
            Backend::Unconfigured(err)
        }
    };

    let listener = TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind))?;
    let local_addr = listener
        .local_addr()
        .context("failed to obtain listener address")?;
    info!("airdrop board listening on {local_addr}");

    let router = http::router(AppState::new(backend));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server exited with error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
