use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::notion::model::RichText;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AirdropStatus {
    Active,
    #[default]
    Upcoming,
    Ended,
    Live,
    Rumored,
    Completed,
}

impl AirdropStatus {
    pub const ALL: [AirdropStatus; 6] = [
        AirdropStatus::Active,
        AirdropStatus::Upcoming,
        AirdropStatus::Ended,
        AirdropStatus::Live,
        AirdropStatus::Rumored,
        AirdropStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AirdropStatus::Active => "Active",
            AirdropStatus::Upcoming => "Upcoming",
            AirdropStatus::Ended => "Ended",
            AirdropStatus::Live => "Live",
            AirdropStatus::Rumored => "Rumored",
            AirdropStatus::Completed => "Completed",
        }
    }

    /// Select-option color used when provisioning the Notion database.
    pub fn color(&self) -> &'static str {
        match self {
            AirdropStatus::Active | AirdropStatus::Live => "green",
            AirdropStatus::Upcoming => "yellow",
            AirdropStatus::Ended => "red",
            AirdropStatus::Rumored => "orange",
            AirdropStatus::Completed => "gray",
        }
    }
}

impl fmt::Display for AirdropStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown airdrop status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for AirdropStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AirdropStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Airdrop as served to the front-end. Built fresh from Notion on every query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Airdrop {
    pub id: String,
    pub notion_id: String,
    pub name: String,
    pub description: String,
    pub status: AirdropStatus,
    pub platform: String,
    pub estimated_value: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub timing: String,
    pub image_url: String,
    pub project_url: String,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable airdrop, shared by the Notion page builder and the local store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewAirdrop {
    pub name: String,
    pub description: String,
    pub status: AirdropStatus,
    pub platform: String,
    pub estimated_value: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub timing: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub featured: bool,
    pub notion_id: Option<String>,
}

impl From<&Airdrop> for NewAirdrop {
    fn from(a: &Airdrop) -> Self {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            name: a.name.clone(),
            description: a.description.clone(),
            status: a.status,
            platform: a.platform.clone(),
            estimated_value: opt(&a.estimated_value),
            start_date: a.start_date,
            end_date: a.end_date,
            timing: Some(a.timing.clone()),
            image_url: opt(&a.image_url),
            project_url: opt(&a.project_url),
            featured: a.featured,
            notion_id: Some(a.notion_id.clone()),
        }
    }
}

/// Partial update for a stored airdrop; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AirdropPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<AirdropStatus>,
    pub platform: Option<String>,
    pub estimated_value: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub timing: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub featured: Option<bool>,
    pub notion_id: Option<String>,
}

/// Airdrop row in the local store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredAirdrop {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: AirdropStatus,
    pub platform: String,
    pub estimated_value: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub timing: Option<String>,
    pub image_url: Option<String>,
    pub project_url: Option<String>,
    pub featured: bool,
    pub notion_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredAirdrop {
    pub fn from_new(id: i64, new: NewAirdrop, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            status: new.status,
            platform: new.platform,
            estimated_value: new.estimated_value,
            start_date: new.start_date,
            end_date: new.end_date,
            timing: new.timing,
            image_url: new.image_url,
            project_url: new.project_url,
            featured: new.featured,
            notion_id: new.notion_id,
            created_at: now,
            updated_at: Some(now),
        }
    }

    /// Overwrite every field from `new`, clearing optional ones it lacks.
    /// `id` and `created_at` are kept.
    pub fn replace(&mut self, new: NewAirdrop, now: DateTime<Utc>) {
        let created_at = self.created_at;
        *self = Self::from_new(self.id, new, now);
        self.created_at = created_at;
    }

    pub fn apply(&mut self, patch: AirdropPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.platform {
            self.platform = v;
        }
        if patch.estimated_value.is_some() {
            self.estimated_value = patch.estimated_value;
        }
        if patch.start_date.is_some() {
            self.start_date = patch.start_date;
        }
        if patch.end_date.is_some() {
            self.end_date = patch.end_date;
        }
        if patch.timing.is_some() {
            self.timing = patch.timing;
        }
        if patch.image_url.is_some() {
            self.image_url = patch.image_url;
        }
        if patch.project_url.is_some() {
            self.project_url = patch.project_url;
        }
        if let Some(v) = patch.featured {
            self.featured = v;
        }
        if patch.notion_id.is_some() {
            self.notion_id = patch.notion_id;
        }
        self.updated_at = Some(now);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// Reference to the one Notion database treated as the airdrops collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseHandle {
    pub id: String,
    pub title: Vec<RichText>,
}

impl DatabaseHandle {
    /// Plain text of the first title fragment, the part used for matching.
    pub fn display_title(&self) -> &str {
        self.title
            .first()
            .map(|t| t.plain_text.as_str())
            .unwrap_or_default()
    }
}

/// Result of the Notion connectivity check. Field names follow the
/// front-end's snake_case contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub notion_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionStatus {
    pub fn connected(page_id: impl Into<String>) -> Self {
        Self {
            notion_connected: true,
            page_id: Some(page_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            notion_connected: false,
            page_id: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("active".parse::<AirdropStatus>().unwrap(), AirdropStatus::Active);
        assert_eq!(" Rumored ".parse::<AirdropStatus>().unwrap(), AirdropStatus::Rumored);
        assert!("Paused".parse::<AirdropStatus>().is_err());
    }

    #[test]
    fn patch_keeps_untouched_fields() {
        let now = Utc::now();
        let new = NewAirdrop {
            name: "Alpha".into(),
            description: "first".into(),
            status: AirdropStatus::Active,
            platform: "Ethereum".into(),
            estimated_value: Some("$10".into()),
            start_date: None,
            end_date: None,
            timing: None,
            image_url: None,
            project_url: None,
            featured: false,
            notion_id: None,
        };
        let mut stored = StoredAirdrop::from_new(1, new, now);
        stored.apply(
            AirdropPatch {
                featured: Some(true),
                ..Default::default()
            },
            now,
        );
        assert!(stored.featured);
        assert_eq!(stored.name, "Alpha");
        assert_eq!(stored.estimated_value.as_deref(), Some("$10"));
    }

    #[test]
    fn replace_clears_missing_optionals() {
        let created = Utc::now() - chrono::Duration::days(1);
        let mut new = NewAirdrop {
            name: "Alpha".into(),
            description: String::new(),
            status: AirdropStatus::Active,
            platform: "Ethereum".into(),
            estimated_value: Some("$10".into()),
            start_date: Some(created),
            end_date: None,
            timing: None,
            image_url: Some("https://img/a.png".into()),
            project_url: None,
            featured: true,
            notion_id: Some("page-1".into()),
        };
        let mut stored = StoredAirdrop::from_new(7, new.clone(), created);
        new.estimated_value = None;
        new.start_date = None;
        new.image_url = None;
        new.featured = false;
        let now = Utc::now();
        stored.replace(new, now);
        assert_eq!((stored.id, stored.created_at), (7, created));
        assert_eq!(stored.updated_at, Some(now));
        assert!(stored.estimated_value.is_none());
        assert!(stored.start_date.is_none());
        assert!(stored.image_url.is_none());
        assert!(!stored.featured);
    }

    #[test]
    fn user_password_not_serialized() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password: "hunter2".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
    }
}
