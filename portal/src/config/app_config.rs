//! Runtime application configuration loaded from the environment.

use academy_client::live::ReconnectPolicy;
use academy_client::{Role, Session};
use announcement_store::NotificationPermission;

use super::defaults::{self, get_default};
use super::validation::validate_setting;

/// Runtime configuration populated from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub role: Role,
    pub course_id: Option<String>,
    pub service_worker_path: String,
    pub live_reconnect: ReconnectPolicy,
    pub notification_permission: NotificationPermission,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/".into(),
            access_token: None,
            role: Role::Student,
            course_id: None,
            service_worker_path: crate::push::DEFAULT_WORKER_PATH.into(),
            live_reconnect: ReconnectPolicy::Never,
            notification_permission: NotificationPermission::Default,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values fall back to defaults. Values that fail validation are
    /// logged and replaced by their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> String {
            let default = get_default(key).unwrap_or_default();
            let Some(raw) = lookup(key) else {
                return default.to_string();
            };
            let value = raw.trim();
            if value.is_empty() {
                return default.to_string();
            }
            match validate_setting(key, value) {
                Ok(()) => value.to_string(),
                Err(e) => {
                    tracing::warn!(key, value, error = %e, "Invalid setting, using default");
                    default.to_string()
                }
            }
        };

        let live_reconnect = match g(defaults::LIVE_RECONNECT).as_str() {
            "backoff" => ReconnectPolicy::Backoff {
                max_attempts: parse_u32(&g(defaults::LIVE_RECONNECT_MAX_ATTEMPTS), 5),
            },
            _ => ReconnectPolicy::Never,
        };

        Self {
            api_base_url: g(defaults::API_BASE_URL),
            access_token: non_empty(g(defaults::ACCESS_TOKEN)),
            role: Role::from_str_setting(&g(defaults::ROLE)).unwrap_or_default(),
            course_id: non_empty(g(defaults::COURSE_ID)),
            service_worker_path: g(defaults::SERVICE_WORKER_PATH),
            live_reconnect,
            notification_permission: NotificationPermission::from_str_setting(&g(
                defaults::NOTIFICATION_PERMISSION,
            )),
        }
    }

    pub fn session(&self) -> Session {
        Session::new(self.access_token.clone(), self.role)
    }

    /// Setting values as shown in startup logs; secrets are masked.
    pub fn settings_info(&self) -> Vec<super::SettingInfo> {
        let reconnect = match self.live_reconnect {
            ReconnectPolicy::Never => ("off".to_string(), None),
            ReconnectPolicy::Backoff { max_attempts } => {
                ("backoff".to_string(), Some(max_attempts.to_string()))
            }
        };
        let values = [
            (defaults::API_BASE_URL, Some(self.api_base_url.clone())),
            (defaults::ACCESS_TOKEN, self.access_token.clone()),
            (defaults::ROLE, Some(self.role.as_str().to_string())),
            (defaults::COURSE_ID, self.course_id.clone()),
            (defaults::SERVICE_WORKER_PATH, Some(self.service_worker_path.clone())),
            (defaults::LIVE_RECONNECT, Some(reconnect.0)),
            (defaults::LIVE_RECONNECT_MAX_ATTEMPTS, reconnect.1),
            (
                defaults::NOTIFICATION_PERMISSION,
                Some(self.notification_permission.as_str().to_string()),
            ),
        ];
        values
            .into_iter()
            .filter_map(|(key, value)| {
                let def = defaults::DEFAULT_SETTINGS.get(key)?;
                let has_value = value.is_some();
                let value = match value {
                    Some(_) if def.secret => "********".to_string(),
                    Some(v) => v,
                    None => String::new(),
                };
                Some(super::SettingInfo {
                    key: key.to_string(),
                    value,
                    secret: def.secret,
                    description: def.description.to_string(),
                    has_value,
                })
            })
            .collect()
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

fn parse_u32(s: &str, default: u32) -> u32 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
