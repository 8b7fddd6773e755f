use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use super::AirdropStore;
use crate::model::{AirdropPatch, AirdropStatus, NewAirdrop, NewUser, StoredAirdrop, User};

pub type Pool = SqlitePool;

const AIRDROP_COLUMNS: &str = "id, name, description, status, platform, estimated_value, \
     start_date, end_date, timing, image_url, project_url, featured, notion_id, \
     created_at, updated_at";

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized)
        .await
        .with_context(|| format!("failed to open {}", normalized))?;
    if !normalized.starts_with("sqlite::memory") {
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(&pool)
            .await?;
    }
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/`, ensure the parent
/// directory exists and ask sqlx to create the file. In-memory URLs pass
/// through untouched.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let query = match query_part {
        Some(q) if q.contains("mode=") => q.to_string(),
        Some(q) => format!("{}&mode=rwc", q),
        None => "mode=rwc".to_string(),
    };
    format!("sqlite://{}?{}", expanded_path, query)
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
    })
}

fn row_to_airdrop(row: &SqliteRow) -> Result<StoredAirdrop> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<AirdropStatus>()
        .map_err(|err| anyhow!("corrupt airdrop row: {}", err))?;
    Ok(StoredAirdrop {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        status,
        platform: row.try_get("platform")?,
        estimated_value: row.try_get("estimated_value")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        timing: row.try_get("timing")?,
        image_url: row.try_get("image_url")?,
        project_url: row.try_get("project_url")?,
        featured: row.try_get("featured")?,
        notion_id: row.try_get("notion_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Airdrop/user store on a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: Pool,
}

impl SqliteStorage {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    async fn fetch_airdrops(&self, sql: &str) -> Result<Vec<StoredAirdrop>> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_airdrop).collect()
    }

    /// Load, change and write back one row inside a transaction.
    async fn modify_airdrop<F>(&self, id: i64, change: F) -> Result<Option<StoredAirdrop>>
    where
        F: FnOnce(&mut StoredAirdrop, DateTime<Utc>) + Send,
    {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(&format!("SELECT {} FROM airdrops WHERE id = ?", AIRDROP_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut airdrop = row_to_airdrop(&row)?;
        change(&mut airdrop, Utc::now());

        sqlx::query(
            "UPDATE airdrops SET name = ?, description = ?, status = ?, platform = ?, \
             estimated_value = ?, start_date = ?, end_date = ?, timing = ?, image_url = ?, \
             project_url = ?, featured = ?, notion_id = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&airdrop.name)
        .bind(&airdrop.description)
        .bind(airdrop.status.as_str())
        .bind(&airdrop.platform)
        .bind(&airdrop.estimated_value)
        .bind(airdrop.start_date)
        .bind(airdrop.end_date)
        .bind(&airdrop.timing)
        .bind(&airdrop.image_url)
        .bind(&airdrop.project_url)
        .bind(airdrop.featured)
        .bind(&airdrop.notion_id)
        .bind(airdrop.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some(airdrop))
    }
}

#[async_trait]
impl AirdropStore for SqliteStorage {
    #[instrument(skip_all)]
    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, password FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    #[instrument(skip_all)]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, password FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    #[instrument(skip_all)]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(
            "INSERT INTO users (username, password) VALUES (?, ?) RETURNING id, username, password",
        )
        .bind(&user.username)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to create user {}", user.username))?;
        row_to_user(&row)
    }

    #[instrument(skip_all)]
    async fn all_airdrops(&self) -> Result<Vec<StoredAirdrop>> {
        self.fetch_airdrops(&format!(
            "SELECT {} FROM airdrops ORDER BY created_at DESC, id DESC",
            AIRDROP_COLUMNS
        ))
        .await
    }

    #[instrument(skip_all)]
    async fn featured_airdrops(&self) -> Result<Vec<StoredAirdrop>> {
        self.fetch_airdrops(&format!(
            "SELECT {} FROM airdrops WHERE featured = 1 ORDER BY created_at DESC, id DESC",
            AIRDROP_COLUMNS
        ))
        .await
    }

    #[instrument(skip_all)]
    async fn airdrop_by_id(&self, id: i64) -> Result<Option<StoredAirdrop>> {
        let row = sqlx::query(&format!("SELECT {} FROM airdrops WHERE id = ?", AIRDROP_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_airdrop).transpose()
    }

    #[instrument(skip_all)]
    async fn airdrop_by_notion_id(&self, notion_id: &str) -> Result<Option<StoredAirdrop>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM airdrops WHERE notion_id = ?",
            AIRDROP_COLUMNS
        ))
        .bind(notion_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_airdrop).transpose()
    }

    #[instrument(skip_all)]
    async fn create_airdrop(&self, airdrop: NewAirdrop) -> Result<StoredAirdrop> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO airdrops (name, description, status, platform, estimated_value, \
             start_date, end_date, timing, image_url, project_url, featured, notion_id, \
             created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            AIRDROP_COLUMNS
        ))
        .bind(&airdrop.name)
        .bind(&airdrop.description)
        .bind(airdrop.status.as_str())
        .bind(&airdrop.platform)
        .bind(&airdrop.estimated_value)
        .bind(airdrop.start_date)
        .bind(airdrop.end_date)
        .bind(&airdrop.timing)
        .bind(&airdrop.image_url)
        .bind(&airdrop.project_url)
        .bind(airdrop.featured)
        .bind(&airdrop.notion_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert airdrop")?;
        row_to_airdrop(&row)
    }

    #[instrument(skip_all)]
    async fn update_airdrop(&self, id: i64, patch: AirdropPatch) -> Result<Option<StoredAirdrop>> {
        self.modify_airdrop(id, |airdrop, now| airdrop.apply(patch, now))
            .await
    }

    #[instrument(skip_all)]
    async fn replace_airdrop(&self, id: i64, new: NewAirdrop) -> Result<Option<StoredAirdrop>> {
        self.modify_airdrop(id, |airdrop, now| airdrop.replace(new, now))
            .await
    }

    #[instrument(skip_all)]
    async fn delete_airdrop(&self, id: i64) -> Result<bool> {
        let res = sqlx::query("DELETE FROM airdrops WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
