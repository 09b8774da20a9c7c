//! Host platform seam.
//!
//! Everything the announcement pipeline needs from the surrounding host
//! (background-script registration, push subscriptions, OS notifications,
//! window focus, clipboard) goes through these traits. A browser bridge,
//! a desktop shell, or [`headless::HeadlessHost`] provide the implementation.

pub mod headless;

use academy_client::api::PushSubscription;
use announcement_store::NotificationPermission;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("not supported by this host: {0}")]
    Unsupported(&'static str),

    #[error("background script registration failed: {0}")]
    Registration(String),

    #[error("push subscription failed: {0}")]
    Subscription(String),

    #[error("notification display failed: {0}")]
    Display(String),

    #[error("window operation failed: {0}")]
    Window(String),

    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}

/// A registered background script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRegistration {
    pub scope: String,
}

/// Host identifier of a displayed OS notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub u64);

/// Data attached to a notification and handed back on click.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationData {
    pub url: Option<String>,
}

/// An OS-level notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsNotification {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub data: NotificationData,
}

/// Background-script and push-service access.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    fn supports_background_scripts(&self) -> bool;

    fn supports_push(&self) -> bool;

    async fn register_background_script(
        &self,
        path: &str,
    ) -> Result<WorkerRegistration, PlatformError>;

    /// Subscribe, or return the subscription the host already holds for this profile.
    async fn subscribe(
        &self,
        registration: &WorkerRegistration,
        application_server_key: &[u8],
    ) -> Result<PushSubscription, PlatformError>;
}

/// Notification permission, OS notifications, and window/clipboard access.
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    async fn request_permission(&self) -> Result<NotificationPermission, PlatformError>;

    async fn show(&self, notification: OsNotification) -> Result<NotificationId, PlatformError>;

    async fn close(&self, id: NotificationId);

    async fn focus_window(&self);

    /// Open a window at `url`, or focus one already showing it.
    async fn open_window(&self, url: &str) -> Result<(), PlatformError>;

    async fn write_clipboard(&self, text: &str) -> Result<(), PlatformError>;
}
