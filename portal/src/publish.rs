//! Teacher-side announcement publishing.

use academy_client::api::NewAnnouncement;
use academy_client::{AcademyApiClient, ClientError, Role};
use announcement_store::{Announcement, AnnouncementKind};
use serde::Deserialize;
use url::Url;

use crate::config::validation::is_course_id;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("title is required")]
    EmptyTitle,

    #[error("content is required")]
    EmptyContent,

    #[error("a class link is required for class announcements")]
    MissingClassLink,

    #[error("class link must be an http(s) URL: {0}")]
    InvalidClassLink(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("only teachers can publish announcements")]
    NotTeacher,

    #[error("invalid course id: {0}")]
    InvalidCourseId(String),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Announcement form as typed by a teacher.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnouncementDraft {
    pub title: String,
    pub content: String,
    #[serde(default, rename = "type")]
    pub kind: AnnouncementKind,
    #[serde(default)]
    pub class_link: Option<String>,
}

impl AnnouncementDraft {
    /// Trim and check the draft. Communication announcements never carry a link.
    pub fn validate(&self) -> Result<NewAnnouncement, DraftError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(DraftError::EmptyContent);
        }

        let class_link = match self.kind {
            AnnouncementKind::Communication => None,
            AnnouncementKind::ClassSchedule => {
                let link = self
                    .class_link
                    .as_deref()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .ok_or(DraftError::MissingClassLink)?;
                match Url::parse(link) {
                    Ok(url) if matches!(url.scheme(), "http" | "https") => Some(link.to_string()),
                    _ => return Err(DraftError::InvalidClassLink(link.to_string())),
                }
            }
        };

        Ok(NewAnnouncement {
            title: title.to_string(),
            content: content.to_string(),
            kind: self.kind,
            class_link,
        })
    }
}

fn ensure_teacher(client: &AcademyApiClient, course_id: &str) -> Result<(), PublishError> {
    if client.session().role != Role::Teacher {
        return Err(PublishError::NotTeacher);
    }
    if !is_course_id(course_id) {
        return Err(PublishError::InvalidCourseId(course_id.to_string()));
    }
    Ok(())
}

/// Validate and publish a draft for a course the teacher owns.
pub async fn publish_announcement(
    client: &AcademyApiClient,
    course_id: &str,
    draft: &AnnouncementDraft,
) -> Result<Option<Announcement>, PublishError> {
    ensure_teacher(client, course_id)?;
    let body = draft.validate()?;
    Ok(client.create_announcement(course_id, &body).await?)
}

/// Announcements the teacher has published for a course.
pub async fn published_announcements(
    client: &AcademyApiClient,
    course_id: &str,
) -> Result<Vec<Announcement>, PublishError> {
    ensure_teacher(client, course_id)?;
    Ok(client.teacher_announcements(course_id).await?)
}
