use announcement_store::{Announcement, AnnouncementId};

use super::*;

impl AcademyApiClient {
    /// Full announcement history for a course the student is enrolled in.
    ///
    /// A `null` body is treated as an empty list.
    pub async fn student_announcements(
        &self,
        course_id: &str,
    ) -> Result<Vec<Announcement>, ClientError> {
        let url = self.endpoint(&["student", "courses", course_id, "announcements"])?;
        let body = self.authenticated_get(url).await?;
        parse_announcement_list(&body)
    }

    /// Record that the student has read an announcement.
    pub async fn mark_announcement_read(
        &self,
        course_id: &str,
        id: &AnnouncementId,
    ) -> Result<(), ClientError> {
        let id = id.to_string();
        let url = self.endpoint(&[
            "student",
            "courses",
            course_id,
            "announcements",
            id.as_str(),
            "read",
        ])?;
        self.authenticated_post_no_body(url).await?;
        tracing::debug!(course_id, announcement_id = %id, "Announcement marked read");
        Ok(())
    }

    /// Announcements a teacher has published for a course.
    pub async fn teacher_announcements(
        &self,
        course_id: &str,
    ) -> Result<Vec<Announcement>, ClientError> {
        let url = self.endpoint(&["teacher", "courses", course_id, "announcements"])?;
        let body = self.authenticated_get(url).await?;
        parse_announcement_list(&body)
    }

    /// Publish a new announcement. Returns the created record when the backend echoes it.
    pub async fn create_announcement(
        &self,
        course_id: &str,
        announcement: &NewAnnouncement,
    ) -> Result<Option<Announcement>, ClientError> {
        let url = self.endpoint(&["teacher", "courses", course_id, "announcements"])?;
        let body = self.authenticated_post(url, announcement).await?;
        tracing::info!(course_id, kind = announcement.kind.as_str(), "Announcement published");
        Ok(serde_json::from_str(&body).ok())
    }
}

pub(super) fn parse_announcement_list(body: &str) -> Result<Vec<Announcement>, ClientError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let list: Option<Vec<Announcement>> = serde_json::from_str(body)?;
    Ok(list.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_empty_bodies_are_empty_lists() {
        assert!(parse_announcement_list("null").unwrap().is_empty());
        assert!(parse_announcement_list("").unwrap().is_empty());
        assert!(parse_announcement_list("[]").unwrap().is_empty());
    }

    #[test]
    fn history_list_parses_mixed_records() {
        let body = r#"[
            {"id": 2, "title": "Live", "content": "Live now", "type": "class_schedule",
             "class_link": "https://meet.example/abc", "created_at": "2024-01-02T00:00:00Z"},
            {"id": 1, "title": "Hello", "content": "Hi", "type": "communication",
             "created_at": "2024-01-01T00:00:00Z", "read_at": "2024-01-01T10:00:00Z"}
        ]"#;
        let list = parse_announcement_list(body).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[0].is_unread());
        assert_eq!(list[0].join_link(), Some("https://meet.example/abc"));
        assert!(list[1].read);
    }

    #[test]
    fn malformed_list_is_an_error() {
        assert!(matches!(
            parse_announcement_list(r#"{"detail":"nope"}"#),
            Err(ClientError::Json(_))
        ));
    }
}
