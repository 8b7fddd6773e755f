//! Locating child databases under the root page.
//!
//! Both scans page through the root's children with Notion's cursor until
//! `has_more` is false. Metadata lookups for individual databases may fail
//! without aborting the scan; those failures are returned to the caller
//! alongside whatever was found. A failure to list children is fatal.
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::model::DatabaseHandle;
use crate::notion::model::Database;
use crate::notion::NotionApi;

/// A child database whose metadata could not be retrieved.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScanFailure {
    pub database_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseScan {
    pub databases: Vec<Database>,
    pub failures: Vec<ScanFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub handle: Option<DatabaseHandle>,
    pub failures: Vec<ScanFailure>,
}

/// Case-insensitive exact match on the first title fragment.
pub fn title_matches(db: &Database, title: &str) -> bool {
    db.title
        .first()
        .map(|t| t.plain_text.to_lowercase() == title.to_lowercase())
        .unwrap_or(false)
}

/// Walk every child block of `root_id`, calling `visit` for each child
/// database whose metadata loads. `visit` returns true to stop the walk once
/// the current page of blocks is done; the next cursor is not fetched.
async fn walk_child_databases<F>(
    api: &dyn NotionApi,
    root_id: &str,
    failures: &mut Vec<ScanFailure>,
    mut visit: F,
) -> Result<()>
where
    F: FnMut(Database) -> bool + Send,
{
    let mut cursor: Option<String> = None;
    loop {
        let page = api
            .list_block_children(root_id, cursor.as_deref())
            .await
            .with_context(|| format!("failed to list children of {}", root_id))?;
        debug!(blocks = page.results.len(), has_more = page.has_more, "child block page");

        let mut stop = false;
        for block in page.results.iter().filter(|b| b.is_child_database()) {
            match api.retrieve_database(&block.id).await {
                Ok(db) => stop |= visit(db),
                Err(err) => {
                    warn!(database_id = %block.id, ?err, "error retrieving database");
                    failures.push(ScanFailure {
                        database_id: block.id.clone(),
                        error: format!("{:#}", err),
                    });
                }
            }
        }

        if stop {
            return Ok(());
        }
        match (page.has_more, page.next_cursor) {
            (true, Some(next)) => cursor = Some(next),
            _ => return Ok(()),
        }
    }
}

/// List every child database of the root page.
#[instrument(skip(api))]
pub async fn scan_child_databases(api: &dyn NotionApi, root_id: &str) -> Result<DatabaseScan> {
    let mut scan = DatabaseScan::default();
    let mut found = Vec::new();
    walk_child_databases(api, root_id, &mut scan.failures, |db| {
        found.push(db);
        false
    })
    .await?;
    scan.databases = found;
    Ok(scan)
}

/// Find the first child database titled `title`. The page holding the match
/// is still read to the end, so `failures` covers all of it.
#[instrument(skip(api))]
pub async fn resolve(api: &dyn NotionApi, root_id: &str, title: &str) -> Result<Resolution> {
    let mut resolution = Resolution::default();
    let mut handle = None;
    walk_child_databases(api, root_id, &mut resolution.failures, |db| {
        if handle.is_none() && title_matches(&db, title) {
            handle = Some(DatabaseHandle {
                id: db.id,
                title: db.title,
            });
        }
        handle.is_some()
    })
    .await?;
    resolution.handle = handle;
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::model::RichText;
    use std::collections::BTreeMap;

    fn db(title: &[&str]) -> Database {
        Database {
            id: "db".into(),
            title: title
                .iter()
                .map(|t| RichText {
                    typ: Some("text".into()),
                    plain_text: t.to_string(),
                })
                .collect(),
            properties: BTreeMap::new(),
        }
    }

    #[test]
    fn title_match_is_case_insensitive_and_exact() {
        assert!(title_matches(&db(&["AIRDROPS"]), "Airdrops"));
        assert!(title_matches(&db(&["airdrops", " archive"]), "Airdrops"));
        assert!(!title_matches(&db(&["Airdrops 2"]), "Airdrops"));
        assert!(!title_matches(&db(&[]), "Airdrops"));
    }
}
