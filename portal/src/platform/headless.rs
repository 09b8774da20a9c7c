//! Terminal host: notifications go to the log, push is unavailable.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use academy_client::api::PushSubscription;
use announcement_store::NotificationPermission;
use async_trait::async_trait;

use super::{
    NotificationId, NotificationSurface, OsNotification, PlatformError, PushPlatform,
    WorkerRegistration,
};

/// Host used by the headless binary.
///
/// Permission is fixed at construction; a `Default` permission is
/// resolved to `Granted` on request, mirroring a user who accepts.
pub struct HeadlessHost {
    permission: Mutex<NotificationPermission>,
    next_id: AtomicU64,
    clipboard: Mutex<Option<String>>,
}

impl HeadlessHost {
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            permission: Mutex::new(permission),
            next_id: AtomicU64::new(1),
            clipboard: Mutex::new(None),
        }
    }

    pub fn clipboard(&self) -> Option<String> {
        self.clipboard.lock().ok().and_then(|c| c.clone())
    }
}

#[async_trait]
impl PushPlatform for HeadlessHost {
    fn supports_background_scripts(&self) -> bool {
        false
    }

    fn supports_push(&self) -> bool {
        false
    }

    async fn register_background_script(
        &self,
        _path: &str,
    ) -> Result<WorkerRegistration, PlatformError> {
        Err(PlatformError::Unsupported("background scripts"))
    }

    async fn subscribe(
        &self,
        _registration: &WorkerRegistration,
        _application_server_key: &[u8],
    ) -> Result<PushSubscription, PlatformError> {
        Err(PlatformError::Unsupported("push"))
    }
}

#[async_trait]
impl NotificationSurface for HeadlessHost {
    fn permission(&self) -> NotificationPermission {
        self.permission
            .lock()
            .map(|p| *p)
            .unwrap_or(NotificationPermission::Denied)
    }

    async fn request_permission(&self) -> Result<NotificationPermission, PlatformError> {
        let mut permission = self
            .permission
            .lock()
            .map_err(|_| PlatformError::Unsupported("permission state"))?;
        if *permission == NotificationPermission::Default {
            *permission = NotificationPermission::Granted;
        }
        Ok(*permission)
    }

    async fn show(&self, notification: OsNotification) -> Result<NotificationId, PlatformError> {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::info!(
            id = id.0,
            title = %notification.title,
            body = %notification.body,
            url = ?notification.data.url,
            "Notification"
        );
        Ok(id)
    }

    async fn close(&self, id: NotificationId) {
        tracing::debug!(id = id.0, "Notification closed");
    }

    async fn focus_window(&self) {
        tracing::debug!("Focus window requested");
    }

    async fn open_window(&self, url: &str) -> Result<(), PlatformError> {
        tracing::info!(url, "Open window requested");
        Ok(())
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), PlatformError> {
        let mut slot = self
            .clipboard
            .lock()
            .map_err(|_| PlatformError::Clipboard("clipboard lock poisoned".into()))?;
        *slot = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_permission_is_granted_on_request() {
        let host = HeadlessHost::new(NotificationPermission::Default);
        assert_eq!(
            host.request_permission().await.unwrap(),
            NotificationPermission::Granted
        );
        assert_eq!(host.permission(), NotificationPermission::Granted);
    }

    #[tokio::test]
    async fn denied_permission_stays_denied() {
        let host = HeadlessHost::new(NotificationPermission::Denied);
        assert_eq!(
            host.request_permission().await.unwrap(),
            NotificationPermission::Denied
        );
    }

    #[tokio::test]
    async fn notification_ids_are_unique_and_clipboard_is_kept() {
        let host = HeadlessHost::new(NotificationPermission::Granted);
        let n = OsNotification {
            title: "t".into(),
            body: "b".into(),
            data: Default::default(),
        };
        let a = host.show(n.clone()).await.unwrap();
        let b = host.show(n).await.unwrap();
        assert_ne!(a, b);

        host.write_clipboard("https://meet.example/abc").await.unwrap();
        assert_eq!(host.clipboard().as_deref(), Some("https://meet.example/abc"));
        assert!(!host.supports_push());
    }
}
