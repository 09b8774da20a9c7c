//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

pub const API_BASE_URL: &str = "ACADEMY_API_BASE_URL";
pub const ACCESS_TOKEN: &str = "ACADEMY_ACCESS_TOKEN";
pub const ROLE: &str = "ACADEMY_ROLE";
pub const COURSE_ID: &str = "ACADEMY_COURSE_ID";
pub const SERVICE_WORKER_PATH: &str = "SERVICE_WORKER_PATH";
pub const LIVE_RECONNECT: &str = "LIVE_RECONNECT";
pub const LIVE_RECONNECT_MAX_ATTEMPTS: &str = "LIVE_RECONNECT_MAX_ATTEMPTS";
pub const NOTIFICATION_PERMISSION: &str = "NOTIFICATION_PERMISSION";

type DefTuple = (&'static str, &'static str, bool, &'static str);

const DEFS: &[DefTuple] = &[
    (API_BASE_URL, "http://localhost:8000/", false, "Backend REST base URL; the live socket uses the same host"),
    (ACCESS_TOKEN, "", true, "Bearer token for the backend session"),
    (ROLE, "student", false, "Session role: student, teacher or admin"),
    (COURSE_ID, "", false, "Course to watch when none is given on the command line"),
    (SERVICE_WORKER_PATH, "/sw.js", false, "Site-root path of the background notification script"),
    (LIVE_RECONNECT, "off", false, "Live channel reconnection: off or backoff"),
    (LIVE_RECONNECT_MAX_ATTEMPTS, "5", false, "Consecutive reconnect attempts before giving up"),
    (NOTIFICATION_PERMISSION, "default", false, "Headless host permission: default, granted or denied"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub secret: bool,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, secret, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    secret,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
