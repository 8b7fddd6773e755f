#![allow(dead_code)]

use airdrop_board::notion::model::{
    Block, BlockChildren, BotUser, Database, Page, PageList, RichText,
};
use airdrop_board::notion::NotionApi;
use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const ROOT: &str = "0123456789abcdef0123456789abcdef";

#[derive(Default)]
struct State {
    child_pages: Vec<Vec<Block>>,
    databases: HashMap<String, Database>,
    failing_databases: HashSet<String>,
    rows: HashMap<String, Vec<Page>>,
    created_databases: Vec<Value>,
    created_pages: Vec<Value>,
    calls: Vec<String>,
    fail_page_create_after: Option<usize>,
    me_error: Option<String>,
    query_error: Option<String>,
    query_page_size: usize,
}

/// In-memory stand-in for the Notion API that records every call.
#[derive(Clone, Default)]
pub struct FakeNotion {
    state: Arc<Mutex<State>>,
}

pub fn block(id: &str, typ: &str) -> Block {
    serde_json::from_value(json!({ "id": id, "type": typ })).unwrap()
}

pub fn database(id: &str, title: &str) -> Database {
    Database {
        id: id.into(),
        title: vec![RichText {
            typ: Some("text".into()),
            plain_text: title.into(),
        }],
        properties: BTreeMap::new(),
    }
}

pub fn airdrop_page(id: &str, name: &str, featured: bool) -> Page {
    serde_json::from_value(json!({
        "id": id,
        "created_time": "2024-05-01T08:00:00.000Z",
        "last_edited_time": "2024-05-01T08:00:00.000Z",
        "properties": {
            "Name": { "title": [ { "plain_text": name } ] },
            "Featured": { "checkbox": featured },
            "Status": { "select": { "name": "Active" } }
        }
    }))
    .unwrap()
}

impl FakeNotion {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.state.try_lock().unwrap().query_page_size = 100;
        fake
    }

    /// Child blocks of the root, one inner Vec per API page.
    pub async fn with_child_pages(self, pages: Vec<Vec<Block>>) -> Self {
        self.state.lock().await.child_pages = pages;
        self
    }

    pub async fn with_database(self, db: Database) -> Self {
        self.state.lock().await.databases.insert(db.id.clone(), db);
        self
    }

    pub async fn with_failing_database(self, id: &str) -> Self {
        self.state
            .lock()
            .await
            .failing_databases
            .insert(id.to_string());
        self
    }

    pub async fn with_rows(self, database_id: &str, rows: Vec<Page>) -> Self {
        self.state
            .lock()
            .await
            .rows
            .insert(database_id.to_string(), rows);
        self
    }

    pub async fn with_query_page_size(self, size: usize) -> Self {
        self.state.lock().await.query_page_size = size;
        self
    }

    pub async fn fail_page_create_after(self, n: usize) -> Self {
        self.state.lock().await.fail_page_create_after = Some(n);
        self
    }

    pub async fn with_me_error(self, message: &str) -> Self {
        self.state.lock().await.me_error = Some(message.to_string());
        self
    }

    pub async fn with_query_error(self, message: &str) -> Self {
        self.state.lock().await.query_error = Some(message.to_string());
        self
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    pub async fn created_databases(&self) -> Vec<Value> {
        self.state.lock().await.created_databases.clone()
    }

    pub async fn created_pages(&self) -> Vec<Value> {
        self.state.lock().await.created_pages.clone()
    }
}

fn cursor_index(cursor: Option<&str>) -> Result<usize> {
    match cursor {
        None => Ok(0),
        Some(c) => c
            .strip_prefix("cursor-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| anyhow!("bad cursor {}", c)),
    }
}

fn featured_filter(filter: Option<&Value>) -> Option<bool> {
    let filter = filter?;
    if filter["property"] == "Featured" {
        filter["checkbox"]["equals"].as_bool()
    } else {
        None
    }
}

fn is_featured(page: &Page) -> bool {
    page.properties
        .get("Featured")
        .and_then(|p| p.get("checkbox"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

#[async_trait::async_trait]
impl NotionApi for FakeNotion {
    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<BlockChildren> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(format!("children {} {:?}", block_id, start_cursor));
        if block_id != ROOT {
            return Err(anyhow!("notion error 404 Not Found: no block {}", block_id));
        }
        let idx = cursor_index(start_cursor)?;
        let results = state.child_pages.get(idx).cloned().unwrap_or_default();
        let has_more = idx + 1 < state.child_pages.len();
        Ok(BlockChildren {
            results,
            has_more,
            next_cursor: has_more.then(|| format!("cursor-{}", idx + 1)),
        })
    }

    async fn retrieve_database(&self, database_id: &str) -> Result<Database> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("retrieve {}", database_id));
        if state.failing_databases.contains(database_id) {
            return Err(anyhow!("notion error 403 Forbidden: restricted"));
        }
        state
            .databases
            .get(database_id)
            .cloned()
            .ok_or_else(|| anyhow!("notion error 404 Not Found: {}", database_id))
    }

    async fn query_database(
        &self,
        database_id: &str,
        filter: Option<&Value>,
        start_cursor: Option<&str>,
    ) -> Result<PageList> {
        let mut state = self.state.lock().await;
        state
            .calls
            .push(format!("query {} {:?}", database_id, start_cursor));
        if let Some(message) = &state.query_error {
            return Err(anyhow!("{}", message));
        }
        let wanted = featured_filter(filter);
        let rows: Vec<Page> = state
            .rows
            .get(database_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|p| wanted.map_or(true, |w| is_featured(p) == w))
            .collect();
        let size = state.query_page_size.max(1);
        let start = cursor_index(start_cursor)? * size;
        let results: Vec<Page> = rows.iter().skip(start).take(size).cloned().collect();
        let has_more = start + size < rows.len();
        Ok(PageList {
            results,
            has_more,
            next_cursor: has_more.then(|| format!("cursor-{}", start / size + 1)),
        })
    }

    async fn create_database(&self, body: &Value) -> Result<Database> {
        let mut state = self.state.lock().await;
        state.calls.push("create_database".to_string());
        state.created_databases.push(body.clone());
        let id = format!("created-db-{}", state.created_databases.len());
        let title = body["title"][0]["text"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let db = database(&id, &title);
        state.databases.insert(id.clone(), db.clone());
        let new_block = block(&id, "child_database");
        if state.child_pages.is_empty() {
            state.child_pages.push(Vec::new());
        }
        if let Some(last) = state.child_pages.last_mut() {
            last.push(new_block);
        }
        Ok(db)
    }

    async fn create_page(&self, body: &Value) -> Result<String> {
        let mut state = self.state.lock().await;
        state.calls.push("create_page".to_string());
        if let Some(limit) = state.fail_page_create_after {
            if state.created_pages.len() >= limit {
                return Err(anyhow!("notion error 429 Too Many Requests: slow down"));
            }
        }
        state.created_pages.push(body.clone());
        Ok(format!("page-{}", state.created_pages.len()))
    }

    async fn me(&self) -> Result<BotUser> {
        let mut state = self.state.lock().await;
        state.calls.push("me".to_string());
        match &state.me_error {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(BotUser {
                id: "bot-1".into(),
                name: Some("airdrop-board".into()),
                typ: Some("bot".into()),
            }),
        }
    }
}

/// Root with a noise page block and the airdrops database holding `rows`.
pub async fn airdrops_workspace(rows: Vec<Page>) -> FakeNotion {
    FakeNotion::new()
        .with_child_pages(vec![vec![
            block("para-1", "paragraph"),
            block("db-airdrops", "child_database"),
        ]])
        .await
        .with_database(database("db-airdrops", "Airdrops"))
        .await
        .with_rows("db-airdrops", rows)
        .await
}
