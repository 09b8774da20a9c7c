//! Backend seams used by the view and the push manager.
//!
//! [`AcademyApiClient`] implements both; tests substitute in-memory fakes.

use academy_client::api::PushSubscription;
use academy_client::{AcademyApiClient, ClientError};
use announcement_store::{Announcement, AnnouncementId};
use async_trait::async_trait;

#[async_trait]
pub trait AnnouncementBackend: Send + Sync {
    async fn student_announcements(&self, course_id: &str)
    -> Result<Vec<Announcement>, ClientError>;

    async fn mark_announcement_read(
        &self,
        course_id: &str,
        id: &AnnouncementId,
    ) -> Result<(), ClientError>;
}

#[async_trait]
pub trait PushBackend: Send + Sync {
    async fn push_public_key(&self) -> Result<Option<String>, ClientError>;

    async fn register_push_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<(), ClientError>;
}

#[async_trait]
impl AnnouncementBackend for AcademyApiClient {
    async fn student_announcements(
        &self,
        course_id: &str,
    ) -> Result<Vec<Announcement>, ClientError> {
        AcademyApiClient::student_announcements(self, course_id).await
    }

    async fn mark_announcement_read(
        &self,
        course_id: &str,
        id: &AnnouncementId,
    ) -> Result<(), ClientError> {
        AcademyApiClient::mark_announcement_read(self, course_id, id).await
    }
}

#[async_trait]
impl PushBackend for AcademyApiClient {
    async fn push_public_key(&self) -> Result<Option<String>, ClientError> {
        AcademyApiClient::push_public_key(self).await
    }

    async fn register_push_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<(), ClientError> {
        AcademyApiClient::register_push_subscription(self, subscription).await
    }
}
