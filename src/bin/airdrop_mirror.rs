use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use airdrop_board::config;
use airdrop_board::db;
use airdrop_board::mirror;
use airdrop_board::notion::NotionClient;
use airdrop_board::service::AirdropService;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Copy airdrops from Notion into the local database and exit"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Only mirror airdrops marked as featured
    #[arg(long)]
    featured_only: bool,
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
    let creds = cfg
        .notion_credentials()
        .context("notion is not configured")?;

    let client = NotionClient::from_credentials(&creds)?;
    let service = AirdropService::from_credentials(Arc::new(client), &creds);
    let store = db::open_store(cfg.storage.database_url.as_deref()).await?;

    let airdrops = service.list_airdrops(args.featured_only).await?;
    info!(count = airdrops.len(), "fetched airdrops from Notion");

    let report = mirror::mirror_airdrops(store.as_ref(), &airdrops).await?;
    println!(
        "Mirrored {} airdrops ({} created, {} updated)",
        airdrops.len(),
        report.created,
        report.updated
    );
    Ok(())
}
