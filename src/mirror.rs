//! Copy Notion airdrops into the local store.
use anyhow::Result;
use tracing::{debug, instrument};

use crate::db::AirdropStore;
use crate::model::{Airdrop, NewAirdrop};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub created: usize,
    pub updated: usize,
}

/// Upsert each airdrop keyed by its Notion page id. Existing rows are
/// overwritten in full, so fields cleared in Notion are cleared locally.
/// Rows that are no longer in Notion are left alone.
#[instrument(skip_all, fields(count = airdrops.len()))]
pub async fn mirror_airdrops(
    store: &dyn AirdropStore,
    airdrops: &[Airdrop],
) -> Result<MirrorReport> {
    let mut report = MirrorReport::default();
    for airdrop in airdrops {
        let new = NewAirdrop::from(airdrop);
        match store.airdrop_by_notion_id(&airdrop.notion_id).await? {
            Some(existing) => {
                store.replace_airdrop(existing.id, new).await?;
                debug!(id = existing.id, notion_id = %airdrop.notion_id, "updated");
                report.updated += 1;
            }
            None => {
                let stored = store.create_airdrop(new).await?;
                debug!(id = stored.id, notion_id = %airdrop.notion_id, "created");
                report.created += 1;
            }
        }
    }
    Ok(report)
}
