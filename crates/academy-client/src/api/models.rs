use announcement_store::AnnouncementKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response of `GET /push/public-key`.
#[derive(Debug, Default, Deserialize)]
pub struct PublicKeyResponse {
    #[serde(default, rename = "publicKey", alias = "public_key")]
    pub public_key: Option<String>,
}

/// Browser-issued push credential material, forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Body of `POST /push/subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: PushKeys,
}

/// Body of `POST /teacher/courses/{course_id}/announcements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementKind,
    pub class_link: Option<String>,
}

/// FastAPI-style error body. `detail` is a string or a validation list.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ApiErrorBody {
    pub fn detail_from(body: &str) -> Option<String> {
        let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail? {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::String(_) | Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
