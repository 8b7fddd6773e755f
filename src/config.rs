//! Configuration loader and validator for the airdrop board.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Problems that keep the Notion backend from starting. These never abort the
/// process; the server reports them through the status endpoint instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotionSetupError {
    #[error("NOTION_INTEGRATION_SECRET is not defined in your environment variables")]
    MissingToken,
    #[error("NOTION_PAGE_URL is not defined in your environment variables")]
    MissingPageUrl,
    #[error("Failed to extract page ID from Notion page URL")]
    InvalidPageUrl,
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub notion: Notion,
    #[serde(default)]
    pub storage: Storage,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Notion API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notion {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_database_title")]
    pub database_title: String,
}

impl Default for Notion {
    fn default() -> Self {
        Self {
            token: None,
            page_url: None,
            version: default_version(),
            database_title: default_database_title(),
        }
    }
}

/// Local relational store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Storage {
    #[serde(default)]
    pub database_url: Option<String>,
}

/// Everything needed to talk to Notion, checked for presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotionCredentials {
    pub token: String,
    pub version: String,
    pub root_page_id: String,
    pub database_title: String,
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_version() -> String {
    "2022-06-28".to_string()
}

fn default_database_title() -> String {
    "Airdrops".to_string()
}

static PAGE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([a-f0-9]{32})(?:[?#]|$)").expect("page id pattern compiles")
});

/// Pull the 32-hex-digit page id out of a Notion page URL.
pub fn extract_page_id(page_url: &str) -> Option<String> {
    PAGE_ID_RE
        .captures(page_url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

impl Config {
    /// Credentials for the Notion backend, or the reason they are unusable.
    pub fn notion_credentials(&self) -> Result<NotionCredentials, NotionSetupError> {
        let token = non_empty(self.notion.token.as_deref()).ok_or(NotionSetupError::MissingToken)?;
        let page_url =
            non_empty(self.notion.page_url.as_deref()).ok_or(NotionSetupError::MissingPageUrl)?;
        let root_page_id = extract_page_id(page_url).ok_or(NotionSetupError::InvalidPageUrl)?;
        Ok(NotionCredentials {
            token: token.to_string(),
            version: self.notion.version.clone(),
            root_page_id,
            database_title: self.notion.database_title.clone(),
        })
    }

    /// Apply environment overrides on top of file values.
    fn apply_env<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = get("NOTION_INTEGRATION_SECRET") {
            self.notion.token = Some(token);
        }
        if let Some(url) = get("NOTION_PAGE_URL") {
            self.notion.page_url = Some(url);
        }
        if let Some(url) = get("DATABASE_URL") {
            self.storage.database_url = Some(url);
        }
        if let Some(bind) = get("BIND_ADDR") {
            self.server.bind = bind;
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Load configuration from a YAML file (if present), apply environment
/// overrides and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
/// - A missing file yields the defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let mut cfg = if path.exists() {
        let content = fs::read_to_string(path)?;
        serde_yaml::from_str(&content)?
    } else {
        Config::default()
    };
    cfg.apply_env(|key| std::env::var(key).ok());
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.bind.trim().is_empty() {
        return Err(ConfigError::Invalid("server.bind must be non-empty"));
    }
    if cfg.notion.version.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.version must be non-empty"));
    }
    if cfg.notion.database_title.trim().is_empty() {
        return Err(ConfigError::Invalid("notion.database_title must be non-empty"));
    }
    Ok(())
}

/// Example YAML shipped with the README.
pub fn example() -> &'static str {
    r#"server:
  bind: "0.0.0.0:5000"

notion:
  token: "YOUR_NOTION_INTEGRATION_SECRET"
  page_url: "https://www.notion.so/Airdrop-Board-0123456789abcdef0123456789abcdef"
  version: "2022-06-28"
  database_title: "Airdrops"

storage:
  database_url: "sqlite://./data/airdrops.db"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        let creds = cfg.notion_credentials().unwrap();
        assert_eq!(creds.root_page_id, "0123456789abcdef0123456789abcdef");
        assert_eq!(creds.database_title, "Airdrops");
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:5000");
        assert_eq!(cfg.notion.version, "2022-06-28");
        assert_eq!(cfg.notion.database_title, "Airdrops");
        assert!(cfg.storage.database_url.is_none());
    }

    #[test]
    fn extract_page_id_variants() {
        let id = "0123456789abcdef0123456789ABCDEF";
        assert_eq!(
            extract_page_id(&format!("https://www.notion.so/My-Page-{id}")).as_deref(),
            Some(id)
        );
        assert_eq!(
            extract_page_id(&format!("https://www.notion.so/{id}?pvs=4")).as_deref(),
            Some(id)
        );
        assert_eq!(
            extract_page_id(&format!("https://www.notion.so/{id}#section")).as_deref(),
            Some(id)
        );
        assert!(extract_page_id("https://www.notion.so/no-id-here").is_none());
        assert!(extract_page_id(&format!("https://www.notion.so/{id}/child")).is_none());
    }

    #[test]
    fn missing_notion_settings_are_reported_not_fatal() {
        let cfg = Config::default();
        validate(&cfg).unwrap();
        assert_eq!(
            cfg.notion_credentials().unwrap_err(),
            NotionSetupError::MissingToken
        );

        let mut cfg = Config::default();
        cfg.notion.token = Some("secret".into());
        assert_eq!(
            cfg.notion_credentials().unwrap_err(),
            NotionSetupError::MissingPageUrl
        );

        cfg.notion.page_url = Some("https://www.notion.so/short".into());
        assert_eq!(
            cfg.notion_credentials().unwrap_err(),
            NotionSetupError::InvalidPageUrl
        );
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("NOTION_INTEGRATION_SECRET", "from-env"),
            ("BIND_ADDR", "127.0.0.1:8080"),
        ]);
        cfg.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(cfg.notion.token.as_deref(), Some("from-env"));
        assert_eq!(cfg.server.bind, "127.0.0.1:8080");
        assert_eq!(
            cfg.storage.database_url.as_deref(),
            Some("sqlite://./data/airdrops.db")
        );
    }

    #[test]
    fn invalid_title_rejected() {
        let mut cfg: Config = serde_yaml::from_str(example()).unwrap();
        cfg.notion.database_title = " ".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("database_title")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, "server:\n  bind: \"127.0.0.1:9000\"\n").unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert!(!cfg.server.bind.is_empty());
        assert_eq!(cfg.notion.database_title, "Airdrops");
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let td = tempdir().unwrap();
        let cfg = load(Some(&td.path().join("absent.yaml"))).unwrap();
        assert_eq!(cfg.notion.version, "2022-06-28");
    }
}
