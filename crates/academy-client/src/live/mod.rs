//! Live announcement feed over WebSocket.
//!
//! Connects to `/ws/courses/{course_id}/announcements` on the backend host,
//! forwards `announcement:new` payloads as typed events, and reports the
//! end of the connection exactly once. The socket is receive-only.
//!
//! By default a closed or failed connection is final and the owner is
//! expected to ask the user to reload. [`ReconnectPolicy::Backoff`] opts
//! into exponential-backoff reconnection instead.

mod connection;
#[cfg(test)]
mod tests;

use std::time::Duration;

use announcement_store::Announcement;
use tokio::sync::{mpsc, watch};
use url::Url;

use crate::ClientError;

const EVENT_CHANNEL_CAPACITY: usize = 256;
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Inbound message discriminant for a freshly published announcement.
pub const EVENT_ANNOUNCEMENT_NEW: &str = "announcement:new";

/// Events delivered by a [`LiveAnnouncementChannel`].
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    Opened,
    Message(Announcement),
    Closed { code: Option<u16>, reason: String },
    Errored(String),
}

impl LiveEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed { .. } | Self::Errored(_))
    }
}

/// Connection lifecycle: `Connecting → Open → Closed | Errored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
    Errored,
}

/// What to do after the socket closes or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Report the failure and stop.
    #[default]
    Never,
    /// Retry with exponential backoff, giving up after `max_attempts`
    /// consecutive failures.
    Backoff { max_attempts: u32 },
}

/// Live channel configuration.
#[derive(Debug, Clone)]
pub struct LiveChannelConfig {
    pub url: Url,
    pub reconnect: ReconnectPolicy,
    /// First reconnect delay; doubled per consecutive failure.
    pub backoff_base: Duration,
}

impl LiveChannelConfig {
    /// Derive the socket URL for a course from the REST base URL.
    pub fn for_course(
        base_url: &str,
        course_id: &str,
        reconnect: ReconnectPolicy,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            url: socket_url(base_url, course_id)?,
            reconnect,
            backoff_base: DEFAULT_BACKOFF_BASE,
        })
    }
}

/// `https://host[:port]/anything` → `wss://host[:port]/ws/courses/{id}/announcements`.
pub fn socket_url(base_url: &str, course_id: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(base_url.trim())?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        _ => return Err(ClientError::InvalidBaseUrl(base_url.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
    url.set_query(None);
    url.set_fragment(None);
    url.set_path("");
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(["ws", "courses", course_id, "announcements"]);
    Ok(url)
}

/// Owner's side of an open channel. Dropping it closes the socket.
pub struct LiveChannelHandle {
    shutdown_tx: mpsc::Sender<()>,
    state_rx: watch::Receiver<ChannelState>,
}

impl LiveChannelHandle {
    pub fn state(&self) -> ChannelState {
        *self.state_rx.borrow()
    }

    /// Ask the connection task to close the socket. Errors are ignored.
    pub fn close(&self) {
        let _ = self.shutdown_tx.try_send(());
    }
}

/// WebSocket client for one course's announcement feed.
pub struct LiveAnnouncementChannel;

impl LiveAnnouncementChannel {
    /// Spawn the connection task. Must be called inside a tokio runtime.
    pub fn open(config: LiveChannelConfig) -> (mpsc::Receiver<LiveEvent>, LiveChannelHandle) {
        let (event_tx, event_rx) = mpsc::channel::<LiveEvent>(EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let (state_tx, state_rx) = watch::channel(ChannelState::Connecting);
        tokio::spawn(Self::run_loop(config, event_tx, state_tx, shutdown_rx));
        (
            event_rx,
            LiveChannelHandle {
                shutdown_tx,
                state_rx,
            },
        )
    }

    async fn run_loop(
        config: LiveChannelConfig,
        event_tx: mpsc::Sender<LiveEvent>,
        state_tx: watch::Sender<ChannelState>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let mut failures: u32 = 0;
        loop {
            state_tx.send_replace(ChannelState::Connecting);
            let outcome =
                Self::connect_once(&config.url, &event_tx, &state_tx, &mut shutdown_rx).await;
            let was_open = *state_tx.borrow() == ChannelState::Open;

            let terminal = match outcome {
                Ok(connection::SessionEnd::Shutdown) => {
                    tracing::info!(url = %config.url, "Live channel closed by owner");
                    state_tx.send_replace(ChannelState::Closed);
                    return;
                }
                Ok(connection::SessionEnd::ServerClosed { code, reason }) => {
                    tracing::warn!(url = %config.url, ?code, reason = %reason, "Live channel closed");
                    LiveEvent::Closed { code, reason }
                }
                Err(e) => {
                    tracing::warn!(url = %config.url, error = %e, "Live channel error");
                    LiveEvent::Errored(e.to_string())
                }
            };

            let ReconnectPolicy::Backoff { max_attempts } = config.reconnect else {
                Self::finish(&state_tx, &event_tx, terminal).await;
                return;
            };

            if was_open {
                failures = 0;
            }
            failures += 1;
            if failures > max_attempts {
                tracing::warn!(failures, "Live channel reconnect attempts exhausted");
                let reason = match terminal {
                    LiveEvent::Errored(e) => e,
                    LiveEvent::Closed { code, reason } => {
                        format!("closed (code {code:?}) {reason}").trim().to_string()
                    }
                    _ => String::new(),
                };
                Self::finish(
                    &state_tx,
                    &event_tx,
                    LiveEvent::Errored(format!("gave up after {max_attempts} attempts: {reason}")),
                )
                .await;
                return;
            }

            let backoff = Self::backoff_duration(config.backoff_base, failures);
            tracing::warn!(
                attempt = failures,
                backoff_ms = backoff.as_millis() as u64,
                "Live channel will reconnect"
            );
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Live channel shutdown requested during reconnect backoff");
                    state_tx.send_replace(ChannelState::Closed);
                    return;
                }
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }

    async fn finish(
        state_tx: &watch::Sender<ChannelState>,
        event_tx: &mpsc::Sender<LiveEvent>,
        terminal: LiveEvent,
    ) {
        let state = match terminal {
            LiveEvent::Closed { .. } => ChannelState::Closed,
            _ => ChannelState::Errored,
        };
        state_tx.send_replace(state);
        let _ = event_tx.send(terminal).await;
    }

    fn backoff_duration(base: Duration, failures: u32) -> Duration {
        let d = base.saturating_mul(2u32.saturating_pow(failures.saturating_sub(1)));
        d.min(MAX_BACKOFF)
    }
}
