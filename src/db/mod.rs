//! Local airdrop/user storage.
//!
//! - `memory`: map-backed store for tests and for running without a database.
//! - `repo`: SQLite store on sqlx; schema lives in `migrations/`.
//!
//! Callers pick an implementation through [`open_store`] and use it through
//! the [`AirdropStore`] trait.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::model::{AirdropPatch, NewAirdrop, NewUser, StoredAirdrop, User};

pub mod memory;
pub mod repo;

pub use memory::MemStorage;
pub use repo::SqliteStorage;

#[async_trait]
pub trait AirdropStore: Send + Sync {
    async fn get_user(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Newest first.
    async fn all_airdrops(&self) -> Result<Vec<StoredAirdrop>>;
    /// Featured only, newest first.
    async fn featured_airdrops(&self) -> Result<Vec<StoredAirdrop>>;
    async fn airdrop_by_id(&self, id: i64) -> Result<Option<StoredAirdrop>>;
    async fn airdrop_by_notion_id(&self, notion_id: &str) -> Result<Option<StoredAirdrop>>;
    async fn create_airdrop(&self, airdrop: NewAirdrop) -> Result<StoredAirdrop>;
    /// `None` when no airdrop has `id`.
    async fn update_airdrop(&self, id: i64, patch: AirdropPatch) -> Result<Option<StoredAirdrop>>;
    /// Full overwrite; optional fields missing from `airdrop` are cleared.
    async fn replace_airdrop(&self, id: i64, airdrop: NewAirdrop) -> Result<Option<StoredAirdrop>>;
    async fn delete_airdrop(&self, id: i64) -> Result<bool>;
}

/// SQLite when a URL is configured, in-memory maps otherwise.
pub async fn open_store(database_url: Option<&str>) -> Result<Arc<dyn AirdropStore>> {
    match database_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => {
            let pool = repo::init_pool(url).await?;
            repo::run_migrations(&pool).await?;
            info!("using sqlite airdrop store");
            Ok(Arc::new(SqliteStorage::new(pool)))
        }
        None => {
            info!("no database configured; using in-memory airdrop store");
            Ok(Arc::new(MemStorage::new()))
        }
    }
}
