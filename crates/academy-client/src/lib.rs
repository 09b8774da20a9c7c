//! Academy backend client library.
//!
//! Provides the REST client for course announcements and Web Push
//! registration, the live announcement WebSocket channel, and VAPID
//! public-key decoding.

pub mod api;
pub mod live;
pub mod push_key;

pub use api::AcademyApiClient;

use serde::{Deserialize, Serialize};

/// Portal role carried by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn from_str_setting(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Some(Self::Student),
            "teacher" => Some(Self::Teacher),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

/// Authenticated session, built once at startup and passed explicitly.
///
/// Obtaining and persisting the token is the caller's concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub role: Role,
}

impl Session {
    pub fn new(access_token: Option<String>, role: Role) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.trim().is_empty()),
            role,
        }
    }

    pub fn bearer(&self) -> Option<String> {
        self.access_token.as_ref().map(|t| format!("Bearer {t}"))
    }
}

/// Unified error type for the academy-client crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Academy API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid push public key: {0}")]
    InvalidPushKey(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl ClientError {
    /// Backend-supplied `detail` message, when the error body carried one.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Api { message, .. } => api::models::ApiErrorBody::detail_from(message),
            _ => None,
        }
    }
}
