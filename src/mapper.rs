//! Translation between Notion page objects and airdrop records.
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::model::{Airdrop, AirdropStatus, NewAirdrop};
use crate::notion::model::Page;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Human-readable countdown for an airdrop window.
pub fn timing(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    if let Some(start) = start.filter(|s| *s > now) {
        let days = days_until(start, now);
        return format!("Starts in {} {}", days, day_word(days));
    }
    match end {
        Some(end) if end > now => {
            let days = days_until(end, now);
            format!("Ends in {} {}", days, day_word(days))
        }
        Some(_) => "Ended".to_string(),
        None => "Unknown".to_string(),
    }
}

/// Whole days up to `target`, rounded up. `target` is after `now`, so a span
/// shorter than a millisecond still counts as one day.
fn days_until(target: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (target - now).num_milliseconds();
    ((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY).max(1)
}

fn day_word(days: i64) -> &'static str {
    if days == 1 {
        "day"
    } else {
        "days"
    }
}

/// Parse a Notion date: a full RFC 3339 timestamp, a timestamp without an
/// offset (sent when the property carries a `time_zone`), or a bare
/// `YYYY-MM-DD`. The last two are read as UTC.
pub fn parse_notion_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn first_plain_text<'a>(
    props: &'a Map<String, Value>,
    name: &str,
    kind: &str,
) -> Option<&'a str> {
    props
        .get(name)?
        .get(kind)?
        .as_array()?
        .first()?
        .get("plain_text")?
        .as_str()
}

fn select_name<'a>(props: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    props.get(name)?.get("select")?.get("name")?.as_str()
}

fn url_value<'a>(props: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    props.get(name)?.get("url")?.as_str()
}

fn checkbox(props: &Map<String, Value>, name: &str) -> Option<bool> {
    props.get(name)?.get("checkbox")?.as_bool()
}

fn date_start(props: &Map<String, Value>, name: &str) -> Option<DateTime<Utc>> {
    let raw = props.get(name)?.get("date")?.get("start")?.as_str()?;
    parse_notion_date(raw)
}

fn status(props: &Map<String, Value>) -> AirdropStatus {
    match select_name(props, "Status") {
        Some(name) => name.parse().unwrap_or_else(|err| {
            debug!(%err, "falling back to default status");
            AirdropStatus::default()
        }),
        None => AirdropStatus::default(),
    }
}

/// Map a database row into an airdrop record. Never fails: every missing or
/// malformed property falls back to a default.
pub fn to_airdrop(page: &Page, now: DateTime<Utc>) -> Airdrop {
    let props = &page.properties;
    let start_date = date_start(props, "StartDate");
    let end_date = date_start(props, "EndDate");
    let timestamp = |raw: &str| {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now)
    };

    Airdrop {
        id: page.id.clone(),
        notion_id: page.id.clone(),
        name: first_plain_text(props, "Name", "title")
            .unwrap_or("Untitled Airdrop")
            .to_string(),
        description: first_plain_text(props, "Description", "rich_text")
            .unwrap_or_default()
            .to_string(),
        status: status(props),
        platform: select_name(props, "Platform").unwrap_or("Other").to_string(),
        estimated_value: first_plain_text(props, "EstimatedValue", "rich_text")
            .unwrap_or("Unknown")
            .to_string(),
        start_date,
        end_date,
        timing: timing(start_date, end_date, now),
        image_url: url_value(props, "ImageUrl").unwrap_or_default().to_string(),
        project_url: url_value(props, "ProjectUrl").unwrap_or_default().to_string(),
        featured: checkbox(props, "Featured").unwrap_or(false),
        created_at: timestamp(&page.created_time),
        updated_at: timestamp(&page.last_edited_time),
    }
}

fn text_property(kind: &str, content: &str) -> Value {
    json!({ kind: [ { "text": { "content": content } } ] })
}

fn date_property(date: DateTime<Utc>) -> Value {
    json!({ "date": { "start": date.format("%Y-%m-%d").to_string() } })
}

/// Page-creation payload for a new airdrop in `database_id`.
pub fn build_airdrop_page_request(database_id: &str, airdrop: &NewAirdrop) -> Value {
    let mut properties = Map::new();
    properties.insert("Name".into(), text_property("title", &airdrop.name));
    properties.insert(
        "Description".into(),
        text_property("rich_text", &airdrop.description),
    );
    properties.insert(
        "Status".into(),
        json!({ "select": { "name": airdrop.status.as_str() } }),
    );
    properties.insert(
        "Platform".into(),
        json!({ "select": { "name": airdrop.platform } }),
    );
    if let Some(value) = airdrop.estimated_value.as_deref().filter(|v| !v.is_empty()) {
        properties.insert("EstimatedValue".into(), text_property("rich_text", value));
    }
    if let Some(start) = airdrop.start_date {
        properties.insert("StartDate".into(), date_property(start));
    }
    if let Some(end) = airdrop.end_date {
        properties.insert("EndDate".into(), date_property(end));
    }
    properties.insert("Featured".into(), json!({ "checkbox": airdrop.featured }));
    if let Some(url) = airdrop.image_url.as_deref().filter(|u| !u.is_empty()) {
        properties.insert("ImageUrl".into(), json!({ "url": url }));
    }
    if let Some(url) = airdrop.project_url.as_deref().filter(|u| !u.is_empty()) {
        properties.insert("ProjectUrl".into(), json!({ "url": url }));
    }

    json!({
        "parent": { "database_id": database_id },
        "properties": Value::Object(properties),
    })
}
