//! In-memory host and backend doubles shared by the portal's unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use academy_client::ClientError;
use academy_client::api::{PushKeys, PushSubscription};
use announcement_store::{Announcement, AnnouncementId, NotificationPermission};
use async_trait::async_trait;

use crate::backend::{AnnouncementBackend, PushBackend};
use crate::platform::{
    NotificationId, NotificationSurface, OsNotification, PlatformError, PushPlatform,
    WorkerRegistration,
};

/// Host that records every platform call.
pub struct FakeHost {
    permission: Mutex<NotificationPermission>,
    permission_answer: Mutex<NotificationPermission>,
    permission_requests: AtomicUsize,
    push_supported: AtomicBool,
    registered: Mutex<Vec<String>>,
    subscribed_keys: Mutex<Vec<Vec<u8>>>,
    shown: Mutex<Vec<OsNotification>>,
    closed: Mutex<Vec<NotificationId>>,
    opened: Mutex<Vec<String>>,
    clipboard: Mutex<Option<String>>,
    focus_count: AtomicUsize,
    next_id: AtomicU64,
}

impl FakeHost {
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            permission: Mutex::new(permission),
            permission_answer: Mutex::new(NotificationPermission::Granted),
            permission_requests: AtomicUsize::new(0),
            push_supported: AtomicBool::new(true),
            registered: Mutex::new(Vec::new()),
            subscribed_keys: Mutex::new(Vec::new()),
            shown: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
            clipboard: Mutex::new(None),
            focus_count: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    /// What the user answers when asked for permission.
    pub fn answer_permission_request_with(&self, answer: NotificationPermission) {
        *self.permission_answer.lock().unwrap() = answer;
    }

    pub fn without_push(self) -> Self {
        self.push_supported.store(false, Ordering::SeqCst);
        self
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }

    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }

    pub fn subscribed_keys(&self) -> Vec<Vec<u8>> {
        self.subscribed_keys.lock().unwrap().clone()
    }

    pub fn shown(&self) -> Vec<OsNotification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn closed(&self) -> Vec<NotificationId> {
        self.closed.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn clipboard(&self) -> Option<String> {
        self.clipboard.lock().unwrap().clone()
    }

    pub fn focus_count(&self) -> usize {
        self.focus_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushPlatform for FakeHost {
    fn supports_background_scripts(&self) -> bool {
        self.push_supported.load(Ordering::SeqCst)
    }

    fn supports_push(&self) -> bool {
        self.push_supported.load(Ordering::SeqCst)
    }

    async fn register_background_script(
        &self,
        path: &str,
    ) -> Result<WorkerRegistration, PlatformError> {
        self.registered.lock().unwrap().push(path.to_string());
        Ok(WorkerRegistration { scope: "/".into() })
    }

    async fn subscribe(
        &self,
        _registration: &WorkerRegistration,
        application_server_key: &[u8],
    ) -> Result<PushSubscription, PlatformError> {
        self.subscribed_keys
            .lock()
            .unwrap()
            .push(application_server_key.to_vec());
        Ok(PushSubscription {
            endpoint: "https://push.example/endpoint/1".into(),
            keys: PushKeys {
                p256dh: "p256".into(),
                auth: "auth".into(),
            },
        })
    }
}

#[async_trait]
impl NotificationSurface for FakeHost {
    fn permission(&self) -> NotificationPermission {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> Result<NotificationPermission, PlatformError> {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        let answer = *self.permission_answer.lock().unwrap();
        *self.permission.lock().unwrap() = answer;
        Ok(answer)
    }

    async fn show(&self, notification: OsNotification) -> Result<NotificationId, PlatformError> {
        self.shown.lock().unwrap().push(notification);
        Ok(NotificationId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn close(&self, id: NotificationId) {
        self.closed.lock().unwrap().push(id);
    }

    async fn focus_window(&self) {
        self.focus_count.fetch_add(1, Ordering::SeqCst);
    }

    async fn open_window(&self, url: &str) -> Result<(), PlatformError> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), PlatformError> {
        *self.clipboard.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

/// Backend that serves a fixed announcement list and records writes.
#[derive(Default)]
pub struct FakeBackend {
    announcements: Mutex<Vec<Announcement>>,
    load_error: Mutex<Option<(u16, String)>>,
    loads: AtomicUsize,
    hang_loads: AtomicBool,
    fail_mark_read: AtomicBool,
    hang_mark_read: AtomicBool,
    marked: Mutex<Vec<(String, AnnouncementId)>>,
    public_key: Mutex<Option<String>>,
    subscriptions: Mutex<Vec<PushSubscription>>,
}

impl FakeBackend {
    pub fn with_announcements(list: Vec<Announcement>) -> Self {
        let backend = Self::default();
        backend.set_announcements(list);
        backend
    }

    pub fn set_announcements(&self, list: Vec<Announcement>) {
        *self.announcements.lock().unwrap() = list;
    }

    /// Make subsequent loads fail with this status and raw body.
    pub fn fail_loads_with(&self, status: u16, body: &str) {
        *self.load_error.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn heal_loads(&self) {
        *self.load_error.lock().unwrap() = None;
    }

    pub fn fail_mark_read(&self) {
        self.fail_mark_read.store(true, Ordering::SeqCst);
    }

    /// Make subsequent loads never complete.
    pub fn hang_loads(&self) {
        self.hang_loads.store(true, Ordering::SeqCst);
    }

    /// Make subsequent read receipts never complete.
    pub fn hang_mark_read(&self) {
        self.hang_mark_read.store(true, Ordering::SeqCst);
    }

    pub fn set_public_key(&self, key: Option<&str>) {
        *self.public_key.lock().unwrap() = key.map(str::to_string);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn marked(&self) -> Vec<(String, AnnouncementId)> {
        self.marked.lock().unwrap().clone()
    }

    pub fn subscriptions(&self) -> Vec<PushSubscription> {
        self.subscriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnnouncementBackend for FakeBackend {
    async fn student_announcements(
        &self,
        _course_id: &str,
    ) -> Result<Vec<Announcement>, ClientError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.hang_loads.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some((status, message)) = self.load_error.lock().unwrap().clone() {
            return Err(ClientError::Api { status, message });
        }
        Ok(self.announcements.lock().unwrap().clone())
    }

    async fn mark_announcement_read(
        &self,
        course_id: &str,
        id: &AnnouncementId,
    ) -> Result<(), ClientError> {
        self.marked
            .lock()
            .unwrap()
            .push((course_id.to_string(), id.clone()));
        if self.hang_mark_read.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_mark_read.load(Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: 500,
                message: "{}".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PushBackend for FakeBackend {
    async fn push_public_key(&self) -> Result<Option<String>, ClientError> {
        Ok(self.public_key.lock().unwrap().clone())
    }

    async fn register_push_subscription(
        &self,
        subscription: &PushSubscription,
    ) -> Result<(), ClientError> {
        self.subscriptions.lock().unwrap().push(subscription.clone());
        Ok(())
    }
}
