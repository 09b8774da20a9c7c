//! Academy REST API client.
//!
//! Typed access to the student/teacher announcement endpoints and the
//! Web Push registration endpoints, with Bearer token injection from the
//! [`Session`].

mod announcements;
mod push;
mod request;

pub mod models;

pub use models::{ApiErrorBody, NewAnnouncement, PublicKeyResponse, PushKeys, PushSubscription};

use url::Url;

use crate::{ClientError, Session};

/// REST client bound to one backend base URL and session.
#[derive(Clone)]
pub struct AcademyApiClient {
    pub(super) http: reqwest::Client,
    pub(super) base_url: Url,
    pub(super) session: Session,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn client(base: &str) -> AcademyApiClient {
        AcademyApiClient::new(base, Session::new(Some("tok".into()), Role::Student)).unwrap()
    }

    #[test]
    fn endpoint_joins_segments_under_base_path() {
        let c = client("https://api.example.com/v1/");
        let url = c.endpoint(&["student", "courses", "42", "announcements"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/student/courses/42/announcements"
        );
    }

    #[test]
    fn endpoint_handles_base_without_trailing_slash() {
        let c = client("https://api.example.com");
        let url = c.endpoint(&["push", "public-key"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/push/public-key");
    }

    #[test]
    fn endpoint_percent_encodes_text_ids() {
        let c = client("https://api.example.com/");
        let url = c
            .endpoint(&["student", "courses", "7", "announcements", "a b/c", "read"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/student/courses/7/announcements/a%20b%2Fc/read"
        );
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let result = AcademyApiClient::new("ftp://example.com", Session::default());
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl(_))));
    }

    #[test]
    fn api_error_detail_is_extracted() {
        let err = ClientError::Api {
            status: 404,
            message: r#"{"detail":"Course not found"}"#.into(),
        };
        assert_eq!(err.detail().as_deref(), Some("Course not found"));

        let plain = ClientError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(plain.detail(), None);
    }
}
