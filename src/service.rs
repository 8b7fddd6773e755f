//! Airdrop queries and setup operations over a Notion workspace.
use anyhow::anyhow;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::config::{NotionCredentials, NotionSetupError};
use crate::mapper;
use crate::model::{Airdrop, ConnectionStatus, DatabaseHandle};
use crate::notion::{checkbox_equals, NotionApi};
use crate::provision::{self, Provisioned};
use crate::resolver::{self, DatabaseScan};
use crate::sample;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    NotConfigured(#[from] NotionSetupError),
    #[error("{0} database not found. Please set up the database first.")]
    DatabaseNotFound(String),
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct AirdropService {
    api: Arc<dyn NotionApi>,
    root_id: String,
    database_title: String,
    provision_lock: Mutex<()>,
}

impl std::fmt::Debug for AirdropService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirdropService")
            .field("root_id", &self.root_id)
            .field("database_title", &self.database_title)
            .finish_non_exhaustive()
    }
}

impl AirdropService {
    pub fn new(
        api: Arc<dyn NotionApi>,
        root_id: impl Into<String>,
        database_title: impl Into<String>,
    ) -> Self {
        Self {
            api,
            root_id: root_id.into(),
            database_title: database_title.into(),
            provision_lock: Mutex::new(()),
        }
    }

    pub fn from_credentials(api: Arc<dyn NotionApi>, creds: &NotionCredentials) -> Self {
        Self::new(api, creds.root_page_id.clone(), creds.database_title.clone())
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn database_title(&self) -> &str {
        &self.database_title
    }

    /// Probe the Notion API with the configured credential.
    pub async fn connection_status(&self) -> ConnectionStatus {
        match self.api.me().await {
            Ok(_) => ConnectionStatus::connected(self.root_id.clone()),
            Err(err) => {
                warn!(?err, "notion connectivity check failed");
                ConnectionStatus::failed(format!("{:#}", err))
            }
        }
    }

    /// Every child database of the root page, with per-database failures.
    pub async fn list_databases(&self) -> ServiceResult<DatabaseScan> {
        Ok(resolver::scan_child_databases(self.api.as_ref(), &self.root_id).await?)
    }

    pub async fn find_database(&self) -> ServiceResult<Option<DatabaseHandle>> {
        let resolution =
            resolver::resolve(self.api.as_ref(), &self.root_id, &self.database_title).await?;
        if !resolution.failures.is_empty() {
            warn!(
                failures = resolution.failures.len(),
                "some databases could not be inspected"
            );
        }
        Ok(resolution.handle)
    }

    /// Create the airdrops database unless one already exists. Calls within
    /// this process are serialized.
    #[instrument(skip(self))]
    pub async fn ensure_database(&self) -> ServiceResult<Provisioned> {
        let _guard = self.provision_lock.lock().await;
        let provisioned = provision::ensure_database(
            self.api.as_ref(),
            &self.root_id,
            &self.database_title,
            provision::airdrop_property_schema(),
        )
        .await?;
        Ok(provisioned)
    }

    /// All airdrops, or only featured ones, in the order Notion returns them.
    /// A missing database yields an empty list.
    #[instrument(skip(self))]
    pub async fn list_airdrops(&self, featured_only: bool) -> ServiceResult<Vec<Airdrop>> {
        let Some(db) = self.find_database().await? else {
            info!(title = %self.database_title, "airdrops database not found");
            return Ok(Vec::new());
        };

        let filter = featured_only.then(|| checkbox_equals("Featured", true));
        let now = Utc::now();
        let mut airdrops = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .api
                .query_database(&db.id, filter.as_ref(), cursor.as_deref())
                .await
                .map_err(|err| err.context("Failed to fetch airdrops from Notion"))?;
            airdrops.extend(page.results.iter().map(|p| mapper::to_airdrop(p, now)));
            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }
        info!(count = airdrops.len(), featured_only, "listed airdrops");
        Ok(airdrops)
    }

    /// Insert the demo airdrops one by one. Earlier inserts are kept when a
    /// later one fails.
    #[instrument(skip(self))]
    pub async fn add_sample_airdrops(&self) -> ServiceResult<usize> {
        let db = self
            .find_database()
            .await?
            .ok_or_else(|| ServiceError::DatabaseNotFound(self.database_title.clone()))?;

        let samples = sample::sample_airdrops(Utc::now());
        let total = samples.len();
        for (inserted, airdrop) in samples.iter().enumerate() {
            let body = mapper::build_airdrop_page_request(&db.id, airdrop);
            if let Err(err) = self.api.create_page(&body).await {
                warn!(?err, inserted, total, "sample insert failed");
                return Err(ServiceError::Upstream(anyhow!(
                    "inserted {} of {} sample airdrops before failure: {:#}",
                    inserted,
                    total,
                    err
                )));
            }
        }
        info!(total, "sample airdrops added");
        Ok(total)
    }
}
