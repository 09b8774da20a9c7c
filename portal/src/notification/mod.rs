//! OS notification dispatch for the foreground page and the background handler.

pub mod worker;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use announcement_store::{Announcement, ClickAction, NotificationPresenter};

use crate::platform::{NotificationData, NotificationId, NotificationSurface, OsNotification};

/// Click actions remembered at once; the oldest is dropped beyond this.
pub const PENDING_CLICK_LIMIT: usize = 32;

/// Shows notifications for new announcements and remembers what a click should do.
pub struct Notifier {
    surface: Arc<dyn NotificationSurface>,
    pending: Mutex<VecDeque<(NotificationId, ClickAction)>>,
}

impl Notifier {
    pub fn new(surface: Arc<dyn NotificationSurface>) -> Self {
        Self {
            surface,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    /// Show a notification if permission is granted. Display failures are logged.
    pub async fn notify(&self, announcement: &Announcement) -> Option<NotificationId> {
        let plan = NotificationPresenter::present(announcement, self.surface.permission())?;
        let notification = OsNotification {
            title: plan.title,
            body: plan.body,
            data: NotificationData {
                url: announcement.join_link().map(str::to_string),
            },
        };

        match self.surface.show(notification).await {
            Ok(id) => {
                if let Ok(mut pending) = self.pending.lock() {
                    pending.push_back((id, plan.click));
                    while pending.len() > PENDING_CLICK_LIMIT {
                        pending.pop_front();
                    }
                }
                tracing::debug!(announcement_id = %announcement.id, id = id.0, "Notification shown");
                Some(id)
            }
            Err(e) => {
                tracing::warn!(announcement_id = %announcement.id, error = %e, "Notification failed");
                None
            }
        }
    }

    /// Close the clicked notification and focus the window.
    ///
    /// Returns the remembered action so the caller can open the meeting
    /// modal; unknown ids fall back to [`ClickAction::FocusWindow`].
    pub async fn handle_click(&self, id: NotificationId) -> ClickAction {
        let action = self
            .pending
            .lock()
            .ok()
            .and_then(|mut pending| {
                let index = pending.iter().position(|(pending_id, _)| *pending_id == id)?;
                pending.remove(index)
            })
            .map(|(_, action)| action)
            .unwrap_or(ClickAction::FocusWindow);
        self.surface.close(id).await;
        self.surface.focus_window().await;
        action
    }

    /// Drop every remembered click action. Later clicks only focus the window.
    pub fn forget_all(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}
