//! Announcement model and wire normalization.
//!
//! The history endpoint and the live feed do not agree on field names
//! (`class_link` vs `classLink`, `read_at` vs `readAt`). Everything goes
//! through [`RawAnnouncement`] on the way in so the rest of the crate only
//! ever sees one canonical shape.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque announcement identifier. Backends send either integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnouncementId {
    Int(i64),
    Text(String),
}

impl fmt::Display for AnnouncementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for AnnouncementId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for AnnouncementId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for AnnouncementId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// Announcement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementKind {
    #[default]
    Communication,
    ClassSchedule,
}

impl AnnouncementKind {
    /// Unknown values fall back to `Communication`.
    pub fn from_wire(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "class_schedule" => Self::ClassSchedule,
            _ => Self::Communication,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Communication => "communication",
            Self::ClassSchedule => "class_schedule",
        }
    }
}

/// A course announcement with read state collapsed into one flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAnnouncement")]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub class_link: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl Announcement {
    pub fn new(
        id: impl Into<AnnouncementId>,
        kind: AnnouncementKind,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            kind,
            class_link: None,
            created_at: None,
            read: false,
            read_at: None,
        }
    }

    pub fn with_class_link(mut self, link: impl Into<String>) -> Self {
        self.class_link = normalize_link(Some(link.into()));
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn is_class_schedule(&self) -> bool {
        self.kind == AnnouncementKind::ClassSchedule
    }

    /// Meeting link for the "Join Class" affordance, if any.
    pub fn join_link(&self) -> Option<&str> {
        self.class_link.as_deref()
    }

    pub fn is_unread(&self) -> bool {
        !self.read
    }

    /// Flip to read. Returns `false` if it was already read.
    pub fn mark_read(&mut self, at: DateTime<Utc>) -> bool {
        if self.read {
            return false;
        }
        self.read = true;
        self.read_at = Some(at);
        true
    }

    /// Reset to the unread default used for live deliveries.
    pub fn mark_unread(&mut self) {
        self.read = false;
        self.read_at = None;
    }
}

/// Wire shape accepted from both the history endpoint and the live feed.
#[derive(Debug, Deserialize)]
struct RawAnnouncement {
    id: AnnouncementId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default, alias = "classLink")]
    class_link: Option<String>,
    #[serde(default, alias = "createdAt")]
    created_at: Option<Value>,
    #[serde(default)]
    read: Option<Value>,
    #[serde(default)]
    read_at: Option<Value>,
    #[serde(default, rename = "readAt")]
    read_at_camel: Option<Value>,
}

impl From<RawAnnouncement> for Announcement {
    fn from(raw: RawAnnouncement) -> Self {
        let read = [&raw.read, &raw.read_at, &raw.read_at_camel]
            .into_iter()
            .any(|v| v.as_ref().is_some_and(is_truthy));
        let read_at = raw
            .read_at
            .as_ref()
            .and_then(parse_timestamp)
            .or_else(|| raw.read_at_camel.as_ref().and_then(parse_timestamp));

        Self {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            content: raw.content.unwrap_or_default(),
            kind: raw
                .kind
                .as_deref()
                .map(AnnouncementKind::from_wire)
                .unwrap_or_default(),
            class_link: normalize_link(raw.class_link),
            created_at: raw.created_at.as_ref().and_then(parse_timestamp),
            read,
            read_at: if read { read_at } else { None },
        }
    }
}

fn normalize_link(link: Option<String>) -> Option<String> {
    link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// RFC 3339, naive ISO 8601 (assumed UTC), or unix seconds.
pub(crate) fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}
