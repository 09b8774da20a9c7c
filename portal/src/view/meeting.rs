//! Meeting-link modal shown when a class notification is clicked.

use serde::Serialize;

use crate::platform::{NotificationSurface, PlatformError};

const FALLBACK_TITLE: &str = "Google Meet session";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeetingModal {
    pub open: bool,
    pub url: Option<String>,
    pub title: Option<String>,
}

impl MeetingModal {
    pub fn show(&mut self, url: impl Into<String>, title: impl Into<String>) {
        let (url, title): (String, String) = (url.into(), title.into());
        self.open = true;
        self.url = Some(url).filter(|u| !u.trim().is_empty());
        self.title = Some(title).filter(|t| !t.trim().is_empty());
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(FALLBACK_TITLE)
    }

    /// Open the meeting in a new window. Returns `false` when there is no link.
    pub async fn join(&self, surface: &dyn NotificationSurface) -> Result<bool, PlatformError> {
        let Some(url) = self.url.as_deref() else {
            return Ok(false);
        };
        surface.open_window(url).await?;
        Ok(true)
    }

    /// Copy the link to the clipboard. Returns `false` when there is no link.
    pub async fn copy_link(
        &self,
        surface: &dyn NotificationSurface,
    ) -> Result<bool, PlatformError> {
        let Some(url) = self.url.as_deref() else {
            return Ok(false);
        };
        surface.write_clipboard(url).await?;
        Ok(true)
    }
}
