//! One-time Web Push subscription handshake.
//!
//! Registers the background notification script, asks the push service
//! for a subscription bound to the backend's VAPID key, and hands it to
//! the backend. Every failure is logged and swallowed: push is an
//! optional extra and must never disturb the announcements view.

use std::sync::Arc;

use academy_client::ClientError;
use academy_client::push_key::decode_application_server_key;
use announcement_store::NotificationPermission;
use tokio::task::JoinHandle;

use crate::backend::PushBackend;
use crate::platform::{NotificationSurface, PlatformError, PushPlatform};

pub const DEFAULT_WORKER_PATH: &str = "/sw.js";

/// How a setup attempt ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushSetupOutcome {
    Subscribed,
    Unsupported,
    PermissionDenied,
    MissingPublicKey,
}

#[derive(Debug, thiserror::Error)]
pub enum PushSetupError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub struct PushSubscriptionManager {
    platform: Arc<dyn PushPlatform>,
    surface: Arc<dyn NotificationSurface>,
    backend: Arc<dyn PushBackend>,
    worker_path: String,
}

impl PushSubscriptionManager {
    pub fn new(
        platform: Arc<dyn PushPlatform>,
        surface: Arc<dyn NotificationSurface>,
        backend: Arc<dyn PushBackend>,
        worker_path: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            surface,
            backend,
            worker_path: worker_path.into(),
        }
    }

    /// Fire-and-forget [`setup_push`](Self::setup_push).
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move { manager.setup_push().await })
    }

    /// Run the handshake, logging the outcome. Never fails.
    pub async fn setup_push(&self) {
        match self.try_setup().await {
            Ok(PushSetupOutcome::Subscribed) => tracing::info!("Push subscription registered"),
            Ok(PushSetupOutcome::Unsupported) => {
                tracing::debug!("Push notifications not supported by this host")
            }
            Ok(PushSetupOutcome::PermissionDenied) => {
                tracing::debug!("Notification permission not granted, skipping push setup")
            }
            Ok(PushSetupOutcome::MissingPublicKey) => {
                tracing::warn!("Backend has no push public key configured")
            }
            Err(e) => tracing::warn!(error = %e, "Push setup failed"),
        }
    }

    pub async fn try_setup(&self) -> Result<PushSetupOutcome, PushSetupError> {
        if !self.platform.supports_background_scripts() || !self.platform.supports_push() {
            return Ok(PushSetupOutcome::Unsupported);
        }

        if self.surface.permission() == NotificationPermission::Default {
            let answer = self.surface.request_permission().await?;
            tracing::debug!(permission = answer.as_str(), "Notification permission requested");
        }
        if self.surface.permission() != NotificationPermission::Granted {
            return Ok(PushSetupOutcome::PermissionDenied);
        }

        let registration = self
            .platform
            .register_background_script(&self.worker_path)
            .await?;
        tracing::info!(scope = %registration.scope, path = %self.worker_path, "Background script registered");

        let Some(public_key) = self.backend.push_public_key().await? else {
            return Ok(PushSetupOutcome::MissingPublicKey);
        };
        let key = decode_application_server_key(&public_key)?;

        let subscription = self.platform.subscribe(&registration, &key).await?;
        self.backend.register_push_subscription(&subscription).await?;
        tracing::debug!(endpoint = %subscription.endpoint, "Push subscription sent to backend");
        Ok(PushSetupOutcome::Subscribed)
    }
}
