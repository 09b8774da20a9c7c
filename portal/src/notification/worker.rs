//! Background notification handler.
//!
//! Runs as its own task and shares no state with the announcements view.
//! It reacts to push deliveries and notification clicks forwarded by the
//! host, and signals each event's [`WaitUntil`] only once the platform
//! call it triggered has finished, so the host keeps it alive until then.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::platform::{NotificationData, NotificationId, NotificationSurface, OsNotification};

const QUEUE_CAPACITY: usize = 100;
const DEFAULT_TITLE: &str = "New notification";

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("background notification handler is not running")]
    NotRunning,
}

/// Completion signal for one event.
#[derive(Debug)]
pub struct WaitUntil(oneshot::Sender<()>);

impl WaitUntil {
    pub fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    pub fn complete(self) {
        let _ = self.0.send(());
    }
}

/// Events the host forwards to the handler.
#[derive(Debug)]
pub enum WorkerEvent {
    Push {
        payload: Option<Vec<u8>>,
        wait_until: WaitUntil,
    },
    NotificationClick {
        id: NotificationId,
        data: NotificationData,
        wait_until: WaitUntil,
    },
}

/// Sending side of the handler.
#[derive(Clone)]
pub struct WorkerHandle {
    tx: mpsc::Sender<WorkerEvent>,
}

impl WorkerHandle {
    /// Deliver a push payload and wait until its notification is shown.
    pub async fn push(&self, payload: Option<Vec<u8>>) -> Result<(), WorkerError> {
        let (wait_until, done) = WaitUntil::channel();
        self.send(WorkerEvent::Push {
            payload,
            wait_until,
        })
        .await?;
        done.await.map_err(|_| WorkerError::NotRunning)
    }

    /// Deliver a click and wait until the window operation completes.
    pub async fn notification_click(
        &self,
        id: NotificationId,
        data: NotificationData,
    ) -> Result<(), WorkerError> {
        let (wait_until, done) = WaitUntil::channel();
        self.send(WorkerEvent::NotificationClick {
            id,
            data,
            wait_until,
        })
        .await?;
        done.await.map_err(|_| WorkerError::NotRunning)
    }

    async fn send(&self, event: WorkerEvent) -> Result<(), WorkerError> {
        self.tx.send(event).await.map_err(|_| WorkerError::NotRunning)
    }
}

pub struct BackgroundNotificationHandler;

impl BackgroundNotificationHandler {
    /// Spawn the handler task. It stops when every handle is dropped or `shutdown` fires.
    pub fn start(
        surface: Arc<dyn NotificationSurface>,
        shutdown: CancellationToken,
    ) -> (WorkerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel::<WorkerEvent>(QUEUE_CAPACITY);
        let task = tokio::spawn(Self::worker_loop(surface, rx, shutdown));
        tracing::info!("Background notification handler started");
        (WorkerHandle { tx }, task)
    }

    async fn worker_loop(
        surface: Arc<dyn NotificationSurface>,
        mut rx: mpsc::Receiver<WorkerEvent>,
        shutdown: CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            match event {
                WorkerEvent::Push {
                    payload,
                    wait_until,
                } => {
                    let notification = Self::parse_push_payload(payload.as_deref());
                    if let Err(e) = surface.show(notification).await {
                        tracing::warn!(error = %e, "Push notification display failed");
                    }
                    wait_until.complete();
                }
                WorkerEvent::NotificationClick {
                    id,
                    data,
                    wait_until,
                } => {
                    surface.close(id).await;
                    if let Some(url) = data.url.as_deref() {
                        if let Err(e) = surface.open_window(url).await {
                            tracing::warn!(url, error = %e, "Failed to open notification target");
                        }
                    }
                    wait_until.complete();
                }
            }
        }

        tracing::info!("Background notification handler stopped");
    }

    /// Payload → notification. Missing or malformed payloads yield the defaults.
    pub fn parse_push_payload(payload: Option<&[u8]>) -> OsNotification {
        let data: Value = payload
            .and_then(|bytes| match serde_json::from_slice(bytes) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::debug!(error = %e, "Push payload is not JSON");
                    None
                }
            })
            .unwrap_or(Value::Null);

        let text = |key: &str| -> Option<String> {
            data.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        OsNotification {
            title: text("title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: text("body").unwrap_or_default(),
            data: NotificationData { url: text("url") },
        }
    }
}
