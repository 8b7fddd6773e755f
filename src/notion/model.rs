use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type", default)]
    pub typ: String,
}

impl Block {
    pub fn is_child_database(&self) -> bool {
        self.typ == "child_database"
    }
}

/// One page of `GET /v1/blocks/{id}/children`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlockChildren {
    #[serde(default)]
    pub results: Vec<Block>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DatabaseProperty {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub typ: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub properties: BTreeMap<String, DatabaseProperty>,
}

/// A row of a database. Properties stay untyped: the mapper reads them
/// defensively.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub last_edited_time: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// One page of `POST /v1/databases/{id}/query`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PageList {
    #[serde(default)]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BotUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub typ: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct CreatePageResponse {
    pub id: String,
}
