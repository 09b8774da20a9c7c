use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::connect_async;

use super::*;

#[derive(Debug, Deserialize)]
struct InboundMessage {
    #[serde(rename = "type", default)]
    message_type: Option<String>,
    #[serde(default)]
    announcement: Option<Value>,
}

pub(super) enum SessionEnd {
    /// The owner closed the channel.
    Shutdown,
    ServerClosed { code: Option<u16>, reason: String },
}

impl LiveAnnouncementChannel {
    pub(super) async fn connect_once(
        url: &Url,
        event_tx: &mpsc::Sender<LiveEvent>,
        state_tx: &watch::Sender<ChannelState>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> Result<SessionEnd, ClientError> {
        use tokio_tungstenite::tungstenite::Message as Msg;

        tracing::info!(url = %url, "Connecting to live announcement channel");
        let mut ws = tokio::select! {
            _ = shutdown_rx.recv() => return Ok(SessionEnd::Shutdown),
            result = connect_async(url.as_str()) => result?.0,
        };

        state_tx.send_replace(ChannelState::Open);
        tracing::info!(url = %url, "Live announcement channel opened");
        if event_tx.send(LiveEvent::Opened).await.is_err() {
            let _ = ws.close(None).await;
            return Ok(SessionEnd::Shutdown);
        }

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    let _ = ws.close(None).await;
                    return Ok(SessionEnd::Shutdown);
                }
                next = ws.next() => {
                    match next {
                        Some(Ok(Msg::Text(text))) => {
                            let Some(announcement) = Self::parse_inbound(&text) else {
                                continue;
                            };
                            tracing::debug!(id = %announcement.id, "New announcement received");
                            if event_tx.send(LiveEvent::Message(announcement)).await.is_err() {
                                let _ = ws.close(None).await;
                                return Ok(SessionEnd::Shutdown);
                            }
                        }
                        Some(Ok(Msg::Ping(data))) => {
                            let _ = ws.send(Msg::Pong(data)).await;
                        }
                        Some(Ok(Msg::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (Some(u16::from(f.code)), f.reason.as_str().to_string()))
                                .unwrap_or((None, String::new()));
                            return Ok(SessionEnd::ServerClosed { code, reason });
                        }
                        None => {
                            return Ok(SessionEnd::ServerClosed {
                                code: None,
                                reason: String::new(),
                            });
                        }
                        Some(Err(e)) => return Err(ClientError::WebSocket(e)),
                        Some(Ok(_)) => {}
                    }
                }
            }
        }
    }

    /// Extract an announcement from a `announcement:new` text frame.
    ///
    /// Anything else (bad JSON, other types, missing or malformed record) is ignored.
    pub(super) fn parse_inbound(text: &str) -> Option<Announcement> {
        let msg: InboundMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::trace!(error = %e, "Ignoring unparseable live message");
                return None;
            }
        };
        if msg.message_type.as_deref() != Some(EVENT_ANNOUNCEMENT_NEW) {
            tracing::trace!(message_type = ?msg.message_type, "Ignoring live message");
            return None;
        }
        let payload = msg.announcement.filter(Value::is_object)?;
        match serde_json::from_value(payload) {
            Ok(announcement) => Some(announcement),
            Err(e) => {
                tracing::trace!(error = %e, "Ignoring malformed announcement payload");
                None
            }
        }
    }
}
