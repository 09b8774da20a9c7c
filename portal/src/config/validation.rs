//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

use super::defaults::{
    API_BASE_URL, COURSE_ID, LIVE_RECONNECT, LIVE_RECONNECT_MAX_ATTEMPTS, NOTIFICATION_PERMISSION,
    ROLE, SERVICE_WORKER_PATH,
};

static RE_HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/?#]+(/[^\s]*)?$").unwrap());
static RE_COURSE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static RE_SITE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/[A-Za-z0-9._~\-/]*$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        API_BASE_URL => {
            if !RE_HTTP_URL.is_match(value) {
                return Err("must be an http(s) URL".into());
            }
        }
        ROLE => {
            if !matches!(value, "student" | "teacher" | "admin") {
                return Err("must be 'student', 'teacher' or 'admin'".into());
            }
        }
        COURSE_ID => {
            if !value.is_empty() && !is_course_id(value) {
                return Err("must be a numeric course id".into());
            }
        }
        SERVICE_WORKER_PATH => {
            if !RE_SITE_PATH.is_match(value) {
                return Err("must be an absolute site path such as /sw.js".into());
            }
        }
        LIVE_RECONNECT => {
            if value != "off" && value != "backoff" {
                return Err("must be 'off' or 'backoff'".into());
            }
        }
        LIVE_RECONNECT_MAX_ATTEMPTS => validate_int_range(value, 1, 20)?,
        NOTIFICATION_PERMISSION => {
            if !matches!(value, "default" | "granted" | "denied") {
                return Err("must be 'default', 'granted' or 'denied'".into());
            }
        }
        _ => {}
    }
    Ok(())
}

/// Course ids in routes are numeric.
pub fn is_course_id(value: &str) -> bool {
    RE_COURSE_ID.is_match(value)
}

fn validate_int_range(value: &str, min: i32, max: i32) -> Result<(), String> {
    let v: i32 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
