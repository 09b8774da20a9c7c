//! UI event constants and the broadcast bus that carries them.
//!
//! Whatever renders the announcements view (a browser bridge, a desktop
//! window, or the headless binary's log) subscribes to these events.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

// -- Event name constants --

pub const ANNOUNCEMENTS_LOADED: &str = "announcements_loaded";
pub const ANNOUNCEMENT_RECEIVED: &str = "announcement_received";
pub const ANNOUNCEMENT_READ: &str = "announcement_read";
pub const LIVE_UPDATES_UNAVAILABLE: &str = "live_updates_unavailable";
pub const TOAST_ERROR: &str = "toast_error";
pub const MEETING_MODAL_OPENED: &str = "meeting_modal_opened";
pub const MEETING_MODAL_CLOSED: &str = "meeting_modal_closed";
pub const MEETING_LINK_COPIED: &str = "meeting_link_copied";

const UI_EVENT_CAPACITY: usize = 256;

// -- Payload types --

#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementsLoadedPayload {
    pub course_id: String,
    pub count: usize,
    pub unread: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementPayload {
    pub course_id: String,
    pub announcement_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveUnavailablePayload {
    pub course_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeetingPayload {
    pub url: String,
    pub title: String,
}

/// A named event with its JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct UiEvent {
    pub name: &'static str,
    pub payload: Value,
}

/// Fan-out bus for UI events. Emitting with no subscribers is not an error.
#[derive(Clone)]
pub struct UiEvents {
    tx: broadcast::Sender<UiEvent>,
}

impl Default for UiEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl UiEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(UI_EVENT_CAPACITY);
        Self { tx }
    }

    pub fn emit(&self, name: &'static str, payload: impl Serialize) {
        let payload = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(event = name, error = %e, "Failed to serialize UI event");
                return;
            }
        };
        let _ = self.tx.send(UiEvent { name, payload });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }
}
