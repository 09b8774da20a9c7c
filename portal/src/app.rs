use std::sync::Arc;

use academy_client::live::ReconnectPolicy;
use academy_client::{AcademyApiClient, ClientError};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::events::UiEvents;
use crate::notification::Notifier;
use crate::platform::{NotificationSurface, PushPlatform};
use crate::push::PushSubscriptionManager;
use crate::view::{AnnouncementsView, LiveSettings, SharedView, ViewDeps};

/// Application shared state handed to the binary, background tasks and tests.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    config: AppConfig,
    client: AcademyApiClient,
    surface: Arc<dyn NotificationSurface>,
    ui: UiEvents,
    view: SharedView,
    shutdown_token: CancellationToken,
}

impl SharedState {
    /// Build the REST client, notifier, push manager and view for one host.
    pub fn new(
        config: AppConfig,
        platform: Arc<dyn PushPlatform>,
        surface: Arc<dyn NotificationSurface>,
    ) -> Result<Self, ClientError> {
        let client = AcademyApiClient::new(&config.api_base_url, config.session())?;
        let backend = Arc::new(client.clone());
        let ui = UiEvents::new();

        let push = Arc::new(PushSubscriptionManager::new(
            platform,
            Arc::clone(&surface),
            backend.clone(),
            config.service_worker_path.clone(),
        ));
        let view = AnnouncementsView::shared(ViewDeps {
            backend,
            notifier: Arc::new(Notifier::new(Arc::clone(&surface))),
            surface: Arc::clone(&surface),
            push: Some(push),
            live: LiveSettings {
                base_url: config.api_base_url.clone(),
                reconnect: config.live_reconnect,
            },
            ui: ui.clone(),
        });

        Ok(Self {
            inner: Arc::new(SharedStateInner {
                config,
                client,
                surface,
                ui,
                view,
                shutdown_token: CancellationToken::new(),
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &AcademyApiClient {
        &self.inner.client
    }

    pub fn surface(&self) -> Arc<dyn NotificationSurface> {
        Arc::clone(&self.inner.surface)
    }

    pub fn ui(&self) -> &UiEvents {
        &self.inner.ui
    }

    pub fn view(&self) -> &SharedView {
        &self.inner.view
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }

    pub fn reconnects(&self) -> bool {
        matches!(self.inner.config.live_reconnect, ReconnectPolicy::Backoff { .. })
    }
}
