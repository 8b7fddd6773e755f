use std::path::PathBuf;
use std::sync::Arc;

use airdrop_board::config;
use airdrop_board::notion::NotionClient;
use airdrop_board::resolver;
use airdrop_board::service::AirdropService;
use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "List the databases under the configured Notion page")]
struct Args {
    /// Path to YAML config
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = config::load(Some(&args.config))?;
    let creds = cfg
        .notion_credentials()
        .context("notion is not configured")?;
    let client = NotionClient::from_credentials(&creds)?;
    let service = AirdropService::from_credentials(Arc::new(client), &creds);

    let scan = service.list_databases().await?;
    println!("Root page: {}", service.root_id());
    for db in &scan.databases {
        let title = db
            .title
            .first()
            .map(|t| t.plain_text.as_str())
            .unwrap_or("(untitled)");
        let marker = if resolver::title_matches(db, service.database_title()) {
            " *"
        } else {
            ""
        };
        println!("Database {} \"{}\"{}", db.id, title, marker);
        for (name, prop) in &db.properties {
            println!("  {} -> {{ id: {}, type: {} }}", name, prop.id, prop.typ);
        }
    }
    for failure in &scan.failures {
        println!("Failed {}: {}", failure.database_id, failure.error);
    }
    Ok(())
}
