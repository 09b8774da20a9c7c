//! Student announcements view controller.
//!
//! Owns one course's announcement state and merges its three sources:
//! REST history on mount and manual refresh, the live channel while the
//! view is mounted, and notification clicks routed back from the host.
//! State changes happen behind the [`SharedView`] lock. Backend requests
//! and host calls are made after it is released, so a slow request never
//! holds up the live event pump.

pub mod meeting;

use std::sync::Arc;

use academy_client::ClientError;
use academy_client::live::{
    LiveAnnouncementChannel, LiveChannelConfig, LiveChannelHandle, LiveEvent, ReconnectPolicy,
};
use announcement_store::{Announcement, AnnouncementId, AnnouncementStore, ClickAction};
use chrono::Utc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::backend::AnnouncementBackend;
use crate::config::validation::is_course_id;
use crate::events::{self, UiEvents};
use crate::notification::Notifier;
use crate::platform::{NotificationId, NotificationSurface};
use crate::push::PushSubscriptionManager;

pub use meeting::MeetingModal;

/// Notifications shown per manual refresh.
pub const REFRESH_NOTIFY_LIMIT: usize = 3;

const LOAD_FAILED_MESSAGE: &str = "Failed to load announcements";

pub type SharedView = Arc<Mutex<AnnouncementsView>>;

/// Where the live channel connects.
#[derive(Debug, Clone)]
pub struct LiveSettings {
    pub base_url: String,
    pub reconnect: ReconnectPolicy,
}

pub struct ViewDeps {
    pub backend: Arc<dyn AnnouncementBackend>,
    pub notifier: Arc<Notifier>,
    pub surface: Arc<dyn NotificationSurface>,
    pub push: Option<Arc<PushSubscriptionManager>>,
    pub live: LiveSettings,
    pub ui: UiEvents,
}

pub struct AnnouncementsView {
    deps: ViewDeps,
    course_id: Option<String>,
    generation: u64,
    store: AnnouncementStore,
    channel: Option<LiveChannelHandle>,
    live_unavailable: bool,
    loading: bool,
    meeting: MeetingModal,
}

impl AnnouncementsView {
    pub fn new(deps: ViewDeps) -> Self {
        Self {
            deps,
            course_id: None,
            generation: 0,
            store: AnnouncementStore::new(),
            channel: None,
            live_unavailable: false,
            loading: false,
            meeting: MeetingModal::default(),
        }
    }

    pub fn shared(deps: ViewDeps) -> SharedView {
        Arc::new(Mutex::new(Self::new(deps)))
    }

    pub fn course_id(&self) -> Option<&str> {
        self.course_id.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn announcements(&self) -> &[Announcement] {
        self.store.as_slice()
    }

    pub fn store(&self) -> &AnnouncementStore {
        &self.store
    }

    pub fn live_unavailable(&self) -> bool {
        self.live_unavailable
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn meeting(&self) -> &MeetingModal {
        &self.meeting
    }

    pub fn ui(&self) -> &UiEvents {
        &self.deps.ui
    }

    /// Tear down the previous course and start a new generation.
    ///
    /// Returns `None` (leaving the view unmounted) unless `course_id` is numeric.
    pub fn begin(&mut self, course_id: &str) -> Option<u64> {
        self.teardown();
        let course_id = course_id.trim();
        if !is_course_id(course_id) {
            tracing::warn!(course_id, "Ignoring mount with invalid course id");
            return None;
        }
        self.course_id = Some(course_id.to_string());
        Some(self.generation)
    }

    /// Mark a load as started and hand out what the request needs.
    ///
    /// The request itself runs without the view lock held.
    fn start_load(&mut self) -> Option<PendingLoad> {
        let course_id = self.course_id.clone()?;
        self.loading = true;
        Some(PendingLoad {
            generation: self.generation,
            course_id,
            backend: Arc::clone(&self.deps.backend),
        })
    }

    /// Apply a finished load. Returns `None` when the view has moved to
    /// another course (or unmounted) in the meantime and the result was dropped.
    fn finish_load(
        &mut self,
        generation: u64,
        course_id: String,
        result: Result<Vec<Announcement>, ClientError>,
    ) -> Option<Result<Vec<AnnouncementId>, ClientError>> {
        if generation != self.generation {
            tracing::debug!(course_id = %course_id, "Dropping load for a previous mount");
            return None;
        }
        self.loading = false;

        match result {
            Ok(list) => {
                let newly_seen = self.store.replace_all(list);
                tracing::debug!(
                    course_id = %course_id,
                    count = self.store.len(),
                    new = newly_seen.len(),
                    "Announcements loaded"
                );
                self.deps.ui.emit(
                    events::ANNOUNCEMENTS_LOADED,
                    events::AnnouncementsLoadedPayload {
                        course_id,
                        count: self.store.len(),
                        unread: self.store.unread_count(),
                    },
                );
                Some(Ok(newly_seen))
            }
            Err(e) => {
                tracing::warn!(course_id = %course_id, error = %e, "Failed to load announcements");
                let message = e.detail().unwrap_or_else(|| LOAD_FAILED_MESSAGE.to_string());
                self.deps
                    .ui
                    .emit(events::TOAST_ERROR, events::ErrorPayload { message });
                Some(Err(e))
            }
        }
    }

    /// Open the live channel for the current course.
    pub fn open_live(&mut self) -> Option<mpsc::Receiver<LiveEvent>> {
        let course_id = self.course_id.clone()?;
        let config = match LiveChannelConfig::for_course(
            &self.deps.live.base_url,
            &course_id,
            self.deps.live.reconnect,
        ) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(course_id = %course_id, error = %e, "Cannot derive live channel URL");
                self.set_live_unavailable(e.to_string());
                return None;
            }
        };
        tracing::info!(course_id = %course_id, url = %config.url, "Opening live channel");
        let (rx, handle) = LiveAnnouncementChannel::open(config);
        self.channel = Some(handle);
        Some(rx)
    }

    /// Apply one live event. Events from an earlier generation are ignored.
    ///
    /// Returns a newly added announcement the caller should notify about.
    pub fn apply_live_event(&mut self, generation: u64, event: LiveEvent) -> Option<Announcement> {
        if generation != self.generation || self.course_id.is_none() {
            tracing::trace!(generation, current = self.generation, "Dropping stale live event");
            return None;
        }
        match event {
            LiveEvent::Opened => {
                tracing::debug!(course_id = ?self.course_id, "Live channel open");
                None
            }
            LiveEvent::Message(announcement) => {
                if !self.store.prepend(announcement.clone()) {
                    tracing::debug!(announcement_id = %announcement.id, "Duplicate live announcement");
                    return None;
                }
                self.deps.ui.emit(
                    events::ANNOUNCEMENT_RECEIVED,
                    events::AnnouncementPayload {
                        course_id: self.course_id.clone().unwrap_or_default(),
                        announcement_id: announcement.id.to_string(),
                        title: announcement.title.clone(),
                    },
                );
                Some(announcement)
            }
            LiveEvent::Closed { code, reason } => {
                let reason = match code {
                    Some(code) => format!("closed with code {code} {reason}").trim().to_string(),
                    None => format!("closed {reason}").trim().to_string(),
                };
                self.set_live_unavailable(reason);
                None
            }
            LiveEvent::Errored(reason) => {
                self.set_live_unavailable(reason);
                None
            }
        }
    }

    fn set_live_unavailable(&mut self, reason: String) {
        if self.live_unavailable {
            return;
        }
        self.live_unavailable = true;
        self.channel = None;
        tracing::warn!(course_id = ?self.course_id, reason = %reason, "Live updates unavailable");
        self.deps.ui.emit(
            events::LIVE_UPDATES_UNAVAILABLE,
            events::LiveUnavailablePayload {
                course_id: self.course_id.clone().unwrap_or_default(),
                reason,
            },
        );
    }

    /// Flip the local read flag. Returns the course id to report to the
    /// backend, or `None` if the id was unknown or already read.
    fn mark_read_local(&mut self, id: &AnnouncementId) -> Option<String> {
        if !self.store.mark_read(id, Utc::now()) {
            return None;
        }
        let course_id = self.course_id.clone().unwrap_or_default();
        self.deps.ui.emit(
            events::ANNOUNCEMENT_READ,
            events::AnnouncementPayload {
                course_id: course_id.clone(),
                announcement_id: id.to_string(),
                title: self
                    .store
                    .get(id)
                    .map(|a| a.title.clone())
                    .unwrap_or_default(),
            },
        );
        Some(course_id)
    }

    /// Open the meeting modal for a class announcement in the list.
    pub fn open_meeting_for(&mut self, id: &AnnouncementId) -> bool {
        let Some((url, title)) = self
            .store
            .get(id)
            .and_then(|a| Some((a.join_link()?.to_string(), a.title.clone())))
        else {
            return false;
        };
        self.open_meeting(url, title);
        true
    }

    fn open_meeting(&mut self, url: String, title: String) {
        self.meeting.show(url, title);
        self.deps.ui.emit(
            events::MEETING_MODAL_OPENED,
            events::MeetingPayload {
                url: self.meeting.url.clone().unwrap_or_default(),
                title: self.meeting.display_title().to_string(),
            },
        );
    }

    pub fn close_meeting(&mut self) {
        if self.meeting.open {
            self.meeting.close();
            self.deps
                .ui
                .emit(events::MEETING_MODAL_CLOSED, serde_json::json!({}));
        }
    }

    /// Close the live channel and forget the course.
    pub fn unmount(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.close();
        }
        if let Some(course_id) = self.course_id.take() {
            tracing::debug!(course_id = %course_id, "Announcements view unmounted");
        }
        self.generation += 1;
        self.store.clear();
        self.live_unavailable = false;
        self.loading = false;
        self.meeting.close();
        self.deps.notifier.forget_all();
    }
}

struct PendingLoad {
    generation: u64,
    course_id: String,
    backend: Arc<dyn AnnouncementBackend>,
}

/// Mount the view on a course: load history, start push setup, open the
/// live channel and spawn its event pump.
///
/// Returns the pump task, or `None` when the course id is invalid, the
/// view was remounted while loading, or the live channel could not be opened.
pub async fn mount(view: &SharedView, course_id: &str) -> Option<JoinHandle<()>> {
    let (generation, push) = {
        let mut v = view.lock().await;
        let generation = v.begin(course_id)?;
        (generation, v.deps.push.clone())
    };
    // Load failures are already surfaced as a toast.
    let _ = load(view).await;

    let rx = {
        let mut v = view.lock().await;
        if v.generation() != generation {
            return None;
        }
        v.open_live()
    };
    if let Some(push) = push {
        push.spawn();
    }
    let rx = rx?;
    Some(tokio::spawn(pump(Arc::clone(view), generation, rx)))
}

/// Switch to another course. The previous channel is closed first.
pub async fn change_course(view: &SharedView, course_id: &str) -> Option<JoinHandle<()>> {
    mount(view, course_id).await
}

/// Replace the view's list with the backend's history.
///
/// Returns ids not present before; empty when nothing is mounted or the
/// result arrived after a course change. Failures are surfaced as a toast.
pub async fn load(view: &SharedView) -> Result<Vec<AnnouncementId>, ClientError> {
    let Some(pending) = view.lock().await.start_load() else {
        return Ok(Vec::new());
    };
    let result = pending
        .backend
        .student_announcements(&pending.course_id)
        .await;
    view.lock()
        .await
        .finish_load(pending.generation, pending.course_id, result)
        .unwrap_or_else(|| Ok(Vec::new()))
}

/// Manual refresh: reload, then notify about up to three newly seen items.
///
/// Returns how many notifications were shown.
pub async fn refresh(view: &SharedView) -> usize {
    let Ok(newly_seen) = load(view).await else {
        return 0;
    };
    let (notifier, announcements) = {
        let v = view.lock().await;
        let announcements: Vec<Announcement> = newly_seen
            .iter()
            .take(REFRESH_NOTIFY_LIMIT)
            .filter_map(|id| v.store.get(id).cloned())
            .collect();
        (Arc::clone(&v.deps.notifier), announcements)
    };
    let mut shown = 0;
    for announcement in &announcements {
        if notifier.notify(announcement).await.is_some() {
            shown += 1;
        }
    }
    shown
}

/// Apply a live event and notify about it once the lock is released.
pub async fn handle_live_event(view: &SharedView, generation: u64, event: LiveEvent) {
    let (notifier, added) = {
        let mut v = view.lock().await;
        let added = v.apply_live_event(generation, event);
        (Arc::clone(&v.deps.notifier), added)
    };
    if let Some(announcement) = added {
        notifier.notify(&announcement).await;
    }
}

/// Optimistically mark an announcement read, then tell the backend in the
/// background.
///
/// Returns `false` if it was unknown or already read; no request is made then.
/// Backend failures are logged and never roll the local flag back.
pub async fn mark_read(view: &SharedView, id: &AnnouncementId) -> bool {
    let (course_id, backend) = {
        let mut v = view.lock().await;
        let Some(course_id) = v.mark_read_local(id) else {
            return false;
        };
        (course_id, Arc::clone(&v.deps.backend))
    };
    let id = id.clone();
    tokio::spawn(async move {
        if let Err(e) = backend.mark_announcement_read(&course_id, &id).await {
            tracing::warn!(course_id = %course_id, announcement_id = %id, error = %e, "Failed to record read state");
        }
    });
    true
}

/// Route a click on a foreground notification.
pub async fn handle_notification_click(view: &SharedView, id: NotificationId) {
    let notifier = Arc::clone(&view.lock().await.deps.notifier);
    if let ClickAction::OpenMeeting { url, title } = notifier.handle_click(id).await {
        view.lock().await.open_meeting(url, title);
    }
}

/// Open the current meeting link in a new window.
pub async fn join_meeting(view: &SharedView) -> bool {
    let (meeting, surface) = {
        let v = view.lock().await;
        (v.meeting.clone(), Arc::clone(&v.deps.surface))
    };
    match meeting.join(surface.as_ref()).await {
        Ok(joined) => joined,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to open meeting");
            false
        }
    }
}

/// Copy the current meeting link to the clipboard.
pub async fn copy_meeting_link(view: &SharedView) -> bool {
    let (meeting, surface, ui) = {
        let v = view.lock().await;
        (v.meeting.clone(), Arc::clone(&v.deps.surface), v.deps.ui.clone())
    };
    match meeting.copy_link(surface.as_ref()).await {
        Ok(true) => {
            ui.emit(
                events::MEETING_LINK_COPIED,
                events::MeetingPayload {
                    url: meeting.url.clone().unwrap_or_default(),
                    title: meeting.display_title().to_string(),
                },
            );
            true
        }
        Ok(false) => false,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to copy meeting link");
            false
        }
    }
}

async fn pump(view: SharedView, generation: u64, mut rx: mpsc::Receiver<LiveEvent>) {
    while let Some(event) = rx.recv().await {
        let terminal = event.is_terminal();
        if view.lock().await.generation() != generation {
            break;
        }
        handle_live_event(&view, generation, event).await;
        if terminal {
            break;
        }
    }
    tracing::debug!(generation, "Live event pump stopped");
}
