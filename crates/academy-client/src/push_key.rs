//! VAPID application-server key decoding.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::ClientError;

/// Decode a base64url public key into the raw bytes the push API expects.
///
/// Padding is optional and the standard `+`/`/` alphabet is accepted too.
pub fn decode_application_server_key(key: &str) -> Result<Vec<u8>, ClientError> {
    let trimmed = key.trim().trim_end_matches('=');
    if trimmed.is_empty() {
        return Err(ClientError::InvalidPushKey("empty key".into()));
    }
    let normalized: String = trimmed
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| ClientError::InvalidPushKey(e.to_string()))
}
