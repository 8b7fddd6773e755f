use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::AirdropStore;
use crate::model::{AirdropPatch, NewAirdrop, NewUser, StoredAirdrop, User};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    airdrops: BTreeMap<i64, StoredAirdrop>,
    next_user_id: i64,
    next_airdrop_id: i64,
}

/// Map-backed store. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemStorage {
    inner: Mutex<Inner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut airdrops: Vec<StoredAirdrop>) -> Vec<StoredAirdrop> {
    airdrops.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    airdrops
}

#[async_trait]
impl AirdropStore for MemStorage {
    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.inner.lock().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let guard = self.inner.lock().await;
        Ok(guard
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut guard = self.inner.lock().await;
        guard.next_user_id += 1;
        let user = User {
            id: guard.next_user_id,
            username: user.username,
            password: user.password,
        };
        guard.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn all_airdrops(&self) -> Result<Vec<StoredAirdrop>> {
        let guard = self.inner.lock().await;
        Ok(newest_first(guard.airdrops.values().cloned().collect()))
    }

    async fn featured_airdrops(&self) -> Result<Vec<StoredAirdrop>> {
        let guard = self.inner.lock().await;
        Ok(newest_first(
            guard
                .airdrops
                .values()
                .filter(|a| a.featured)
                .cloned()
                .collect(),
        ))
    }

    async fn airdrop_by_id(&self, id: i64) -> Result<Option<StoredAirdrop>> {
        Ok(self.inner.lock().await.airdrops.get(&id).cloned())
    }

    async fn airdrop_by_notion_id(&self, notion_id: &str) -> Result<Option<StoredAirdrop>> {
        let guard = self.inner.lock().await;
        Ok(guard
            .airdrops
            .values()
            .find(|a| a.notion_id.as_deref() == Some(notion_id))
            .cloned())
    }

    async fn create_airdrop(&self, airdrop: NewAirdrop) -> Result<StoredAirdrop> {
        let mut guard = self.inner.lock().await;
        guard.next_airdrop_id += 1;
        let stored = StoredAirdrop::from_new(guard.next_airdrop_id, airdrop, Utc::now());
        guard.airdrops.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_airdrop(&self, id: i64, patch: AirdropPatch) -> Result<Option<StoredAirdrop>> {
        let mut guard = self.inner.lock().await;
        let Some(existing) = guard.airdrops.get_mut(&id) else {
            return Ok(None);
        };
        existing.apply(patch, Utc::now());
        Ok(Some(existing.clone()))
    }

    async fn replace_airdrop(&self, id: i64, airdrop: NewAirdrop) -> Result<Option<StoredAirdrop>> {
        let mut guard = self.inner.lock().await;
        let Some(existing) = guard.airdrops.get_mut(&id) else {
            return Ok(None);
        };
        existing.replace(airdrop, Utc::now());
        Ok(Some(existing.clone()))
    }

    async fn delete_airdrop(&self, id: i64) -> Result<bool> {
        Ok(self.inner.lock().await.airdrops.remove(&id).is_some())
    }
}
