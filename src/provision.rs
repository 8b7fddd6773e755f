use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use tracing::{info, instrument};

use crate::model::{AirdropStatus, DatabaseHandle};
use crate::notion::NotionApi;
use crate::resolver;

pub const PLATFORMS: [(&str, &str); 7] = [
    ("Ethereum", "blue"),
    ("Solana", "purple"),
    ("BSC", "yellow"),
    ("Polygon", "green"),
    ("Arbitrum", "pink"),
    ("Optimism", "red"),
    ("Other", "gray"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned {
    Existing(DatabaseHandle),
    Created(DatabaseHandle),
}

impl Provisioned {
    pub fn handle(&self) -> &DatabaseHandle {
        match self {
            Provisioned::Existing(h) | Provisioned::Created(h) => h,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Provisioned::Created(_))
    }
}

fn select_options<'a>(options: impl IntoIterator<Item = (&'a str, &'a str)>) -> Value {
    let options: Vec<Value> = options
        .into_iter()
        .map(|(name, color)| json!({ "name": name, "color": color }))
        .collect();
    json!({ "select": { "options": options } })
}

/// Column layout of the airdrops database.
pub fn airdrop_property_schema() -> Value {
    let mut properties = Map::new();
    properties.insert("Name".into(), json!({ "title": {} }));
    properties.insert("Description".into(), json!({ "rich_text": {} }));
    properties.insert(
        "Status".into(),
        select_options(AirdropStatus::ALL.iter().map(|s| (s.as_str(), s.color()))),
    );
    properties.insert("Platform".into(), select_options(PLATFORMS));
    properties.insert("EstimatedValue".into(), json!({ "rich_text": {} }));
    properties.insert("StartDate".into(), json!({ "date": {} }));
    properties.insert("EndDate".into(), json!({ "date": {} }));
    properties.insert("Featured".into(), json!({ "checkbox": {} }));
    properties.insert("ImageUrl".into(), json!({ "url": {} }));
    properties.insert("ProjectUrl".into(), json!({ "url": {} }));
    Value::Object(properties)
}

pub fn build_create_database_request(root_id: &str, title: &str, properties: Value) -> Value {
    json!({
        "parent": { "type": "page_id", "page_id": root_id },
        "title": [
            {
                "type": "text",
                "text": { "content": title }
            }
        ],
        "properties": properties,
    })
}

/// Return the database titled `title`, creating it under `root_id` with
/// `properties` when absent. An existing database is returned as-is, without
/// checking its columns against `properties`.
#[instrument(skip(api, properties))]
pub async fn ensure_database(
    api: &dyn NotionApi,
    root_id: &str,
    title: &str,
    properties: Value,
) -> Result<Provisioned> {
    let resolution = resolver::resolve(api, root_id, title).await?;
    if let Some(handle) = resolution.handle {
        info!(database_id = %handle.id, "database already exists");
        return Ok(Provisioned::Existing(handle));
    }

    let body = build_create_database_request(root_id, title, properties);
    let created = api
        .create_database(&body)
        .await
        .with_context(|| format!("failed to create database \"{}\"", title))?;
    info!(database_id = %created.id, "created database");
    Ok(Provisioned::Created(DatabaseHandle {
        id: created.id,
        title: created.title,
    }))
}
