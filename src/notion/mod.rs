use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, warn};

use crate::config::NotionCredentials;
use crate::notion::model::{BlockChildren, BotUser, CreatePageResponse, Database, PageList};

pub mod model;

const NOTION_API_BASE: &str = "https://api.notion.com/";

/// The Notion primitives the airdrop core is built from.
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// One page of a block's direct children.
    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<BlockChildren>;

    async fn retrieve_database(&self, database_id: &str) -> Result<Database>;

    /// One page of a database query, optionally filtered.
    async fn query_database(
        &self,
        database_id: &str,
        filter: Option<&Value>,
        start_cursor: Option<&str>,
    ) -> Result<PageList>;

    async fn create_database(&self, body: &Value) -> Result<Database>;

    /// Create a page and return its id.
    async fn create_page(&self, body: &Value) -> Result<String>;

    /// The integration's bot user; used as a connectivity probe.
    async fn me(&self) -> Result<BotUser>;
}

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    base_url: Url,
    token: String,
    version: String,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    pub fn new(token: String, version: String) -> Result<Self> {
        let base_url = Url::parse(NOTION_API_BASE).context("invalid default Notion URL")?;
        Self::with_base_url(token, version, base_url)
    }

    pub fn with_base_url(token: String, version: String, base_url: Url) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("airdrop-board/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self {
            http,
            base_url,
            token,
            version,
        })
    }

    pub fn from_credentials(creds: &NotionCredentials) -> Result<Self> {
        Self::new(creds.token.clone(), creds.version.clone())
    }

    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Request> {
        let endpoint = self
            .base_url
            .join(path)
            .context("invalid Notion base URL")?;
        let mut builder = self
            .http
            .request(method, endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version);
        if let Some(body) = body {
            builder = builder
                .header("Content-Type", "application/json")
                .json(body);
        }
        builder.build().context("failed to build Notion request")
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let request = self.build_request(method, path, body)?;
        debug!(method=%request.method(), url=%request.url(), "sending notion request");
        if let Some(body) = body {
            debug!(payload=%body, "notion request payload");
        }

        let res = self
            .http
            .execute(request)
            .await
            .context("failed to reach Notion")?;

        if res.status() == StatusCode::TOO_MANY_REQUESTS {
            let body = res.text().await.unwrap_or_default();
            warn!("Rate limited by Notion: {}", body);
            return Err(anyhow!("received 429 from Notion: {}", body));
        }
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            warn!("Notion API error - Status: {}, Body: {}", status, body);
            return Err(anyhow!("notion error {}: {}", status, body));
        }

        let response_body = res.text().await.context("failed to read Notion response")?;
        debug!(len = response_body.len(), "notion response received");
        serde_json::from_str(&response_body).context("invalid Notion response JSON")
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<BlockChildren> {
        let mut path = format!("v1/blocks/{}/children", block_id);
        if let Some(cursor) = start_cursor {
            path.push_str("?start_cursor=");
            path.push_str(cursor);
        }
        self.send(Method::GET, &path, None).await
    }

    async fn retrieve_database(&self, database_id: &str) -> Result<Database> {
        self.send(Method::GET, &format!("v1/databases/{}", database_id), None)
            .await
    }

    async fn query_database(
        &self,
        database_id: &str,
        filter: Option<&Value>,
        start_cursor: Option<&str>,
    ) -> Result<PageList> {
        let body = build_query_request(filter, start_cursor);
        self.send(
            Method::POST,
            &format!("v1/databases/{}/query", database_id),
            Some(&body),
        )
        .await
    }

    async fn create_database(&self, body: &Value) -> Result<Database> {
        self.send(Method::POST, "v1/databases", Some(body)).await
    }

    async fn create_page(&self, body: &Value) -> Result<String> {
        let payload: CreatePageResponse = self.send(Method::POST, "v1/pages", Some(body)).await?;
        debug!(page_id = %payload.id, "created notion page");
        Ok(payload.id)
    }

    async fn me(&self) -> Result<BotUser> {
        self.send(Method::GET, "v1/users/me", None).await
    }
}

/// Body for a database query; both parts are optional.
pub fn build_query_request(filter: Option<&Value>, start_cursor: Option<&str>) -> Value {
    let mut body = json!({});
    if let Some(filter) = filter {
        body["filter"] = filter.clone();
    }
    if let Some(cursor) = start_cursor {
        body["start_cursor"] = Value::String(cursor.to_string());
    }
    body
}

/// Equality filter on a checkbox property.
pub fn checkbox_equals(property: &str, value: bool) -> Value {
    json!({
        "property": property,
        "checkbox": { "equals": value }
    })
}
