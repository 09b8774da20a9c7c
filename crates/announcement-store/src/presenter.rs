//! Decides whether and how a new announcement becomes an OS notification.

use serde::{Deserialize, Serialize};

use crate::model::{Announcement, AnnouncementId};

/// Instruction line appended to class notifications that carry a link.
pub const CLASS_LINK_HINT: &str = "Click to join class";

/// OS notification permission as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl NotificationPermission {
    pub fn from_str_setting(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "granted" => Self::Granted,
            "denied" => Self::Denied,
            _ => Self::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

/// What happens when the user clicks a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClickAction {
    FocusWindow,
    /// Focus the window, then open the meeting-link modal.
    OpenMeeting { url: String, title: String },
}

/// A notification ready to hand to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPlan {
    pub announcement_id: AnnouncementId,
    pub title: String,
    pub body: String,
    pub click: ClickAction,
}

pub struct NotificationPresenter;

impl NotificationPresenter {
    /// Build a plan, or `None` unless permission is exactly `Granted`.
    pub fn present(
        announcement: &Announcement,
        permission: NotificationPermission,
    ) -> Option<NotificationPlan> {
        if permission != NotificationPermission::Granted {
            return None;
        }
        Some(NotificationPlan {
            announcement_id: announcement.id.clone(),
            title: Self::title_for(announcement),
            body: Self::body_for(announcement),
            click: Self::click_action_for(announcement),
        })
    }

    pub fn title_for(announcement: &Announcement) -> String {
        if announcement.is_class_schedule() {
            format!("Class scheduled: {}", announcement.title)
        } else {
            format!("New announcement: {}", announcement.title)
        }
    }

    pub fn body_for(announcement: &Announcement) -> String {
        match announcement.join_link() {
            Some(_) if announcement.is_class_schedule() => {
                format!("{}\n{CLASS_LINK_HINT}", announcement.content)
            }
            _ => announcement.content.clone(),
        }
    }

    pub fn click_action_for(announcement: &Announcement) -> ClickAction {
        match announcement.join_link() {
            Some(url) => ClickAction::OpenMeeting {
                url: url.to_string(),
                title: announcement.title.clone(),
            },
            None => ClickAction::FocusWindow,
        }
    }
}
