use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use super::*;

/// Accept one client, send `frames`, optionally close, then drain until the client leaves.
async fn serve_once(frames: Vec<Message>, close_after: bool) -> (Url, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in frames {
            ws.send(frame).await.unwrap();
        }
        if close_after {
            let _ = ws.close(None).await;
        }
        while let Some(Ok(_)) = ws.next().await {}
    });
    let url = Url::parse(&format!("ws://{addr}/ws/courses/42/announcements")).unwrap();
    (url, handle)
}

fn config(url: Url) -> LiveChannelConfig {
    LiveChannelConfig {
        url,
        reconnect: ReconnectPolicy::Never,
        backoff_base: DEFAULT_BACKOFF_BASE,
    }
}

fn backoff_config(url: Url, max_attempts: u32, backoff_base: Duration) -> LiveChannelConfig {
    LiveChannelConfig {
        url,
        reconnect: ReconnectPolicy::Backoff { max_attempts },
        backoff_base,
    }
}

/// Accept one client per session, send its frames and close. The listener
/// is dropped afterwards so later connects are refused.
async fn serve_sessions(sessions: Vec<Vec<Message>>) -> (Url, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        for frames in sessions {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            for frame in frames {
                ws.send(frame).await.unwrap();
            }
            let _ = ws.close(None).await;
            while let Some(Ok(_)) = ws.next().await {}
        }
    });
    let url = Url::parse(&format!("ws://{addr}/ws/courses/42/announcements")).unwrap();
    (url, handle)
}

async fn refused_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("ws://{addr}/ws/courses/1/announcements")).unwrap()
}

fn new_announcement(id: i64) -> Message {
    Message::text(format!(
        r#"{{"type":"announcement:new","announcement":{{"id":{id},"title":"t{id}","content":"c"}}}}"#
    ))
}

async fn collect(mut rx: mpsc::Receiver<LiveEvent>) -> Vec<LiveEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[test]
fn socket_url_uses_backend_host_and_secure_scheme() {
    let url = socket_url("https://api.example.com/v1/", "42").unwrap();
    assert_eq!(url.as_str(), "wss://api.example.com/ws/courses/42/announcements");

    let local = socket_url("http://localhost:8000", "7").unwrap();
    assert_eq!(local.as_str(), "ws://localhost:8000/ws/courses/7/announcements");
}

#[test]
fn socket_url_rejects_unsupported_scheme() {
    assert!(matches!(
        socket_url("ftp://example.com", "1"),
        Err(ClientError::InvalidBaseUrl(_))
    ));
}

#[test]
fn parse_inbound_accepts_new_announcement() {
    let text = r#"{"type":"announcement:new","announcement":{"id":2,"title":"Algebra",
        "type":"class_schedule","content":"Live now","classLink":"https://meet.example/abc",
        "createdAt":"2024-01-02T00:00:00Z"}}"#;
    let announcement = LiveAnnouncementChannel::parse_inbound(text).unwrap();
    assert_eq!(announcement.id, announcement_store::AnnouncementId::Int(2));
    assert_eq!(announcement.join_link(), Some("https://meet.example/abc"));
}

#[test]
fn parse_inbound_ignores_everything_else() {
    for text in [
        "not json",
        "[1,2,3]",
        r#"{"type":"announcement:deleted","announcement":{"id":1}}"#,
        r#"{"type":"announcement:new"}"#,
        r#"{"type":"announcement:new","announcement":"oops"}"#,
        r#"{"type":"announcement:new","announcement":{"title":"no id"}}"#,
    ] {
        assert!(LiveAnnouncementChannel::parse_inbound(text).is_none(), "{text}");
    }
}

#[test]
fn backoff_doubles_and_caps() {
    let base = DEFAULT_BACKOFF_BASE;
    assert_eq!(LiveAnnouncementChannel::backoff_duration(base, 1), Duration::from_secs(2));
    assert_eq!(LiveAnnouncementChannel::backoff_duration(base, 2), Duration::from_secs(4));
    assert_eq!(LiveAnnouncementChannel::backoff_duration(base, 4), Duration::from_secs(16));
    assert_eq!(LiveAnnouncementChannel::backoff_duration(base, 10), MAX_BACKOFF);
    assert_eq!(LiveAnnouncementChannel::backoff_duration(base, u32::MAX), MAX_BACKOFF);
}

#[tokio::test]
async fn delivers_messages_then_reports_close_once() {
    let (url, server) = serve_once(
        vec![
            Message::text("garbage"),
            Message::text(
                r#"{"type":"announcement:new","announcement":{"id":2,"title":"t","content":"c"}}"#,
            ),
            Message::text(r#"{"type":"presence","announcement":null}"#),
        ],
        true,
    )
    .await;

    let (rx, handle) = LiveAnnouncementChannel::open(config(url));
    let events = collect(rx).await;

    assert_eq!(events.len(), 3, "{events:?}");
    assert_eq!(events[0], LiveEvent::Opened);
    assert!(matches!(&events[1], LiveEvent::Message(a) if a.title == "t"));
    assert!(matches!(events[2], LiveEvent::Closed { .. }));
    assert_eq!(handle.state(), ChannelState::Closed);
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_reports_error() {
    let (rx, handle) = LiveAnnouncementChannel::open(config(refused_url().await));
    let events = collect(rx).await;

    assert_eq!(events.len(), 1, "{events:?}");
    assert!(matches!(events[0], LiveEvent::Errored(_)));
    assert_eq!(handle.state(), ChannelState::Errored);
}

#[tokio::test]
async fn owner_close_ends_stream_without_terminal_event() {
    let (url, server) = serve_once(Vec::new(), false).await;

    let (mut rx, handle) = LiveAnnouncementChannel::open(config(url));
    assert_eq!(rx.recv().await, Some(LiveEvent::Opened));

    handle.close();
    assert_eq!(rx.recv().await, None);
    assert_eq!(handle.state(), ChannelState::Closed);
    server.await.unwrap();
}

#[tokio::test]
async fn dropping_the_handle_closes_the_socket() {
    let (url, server) = serve_once(Vec::new(), false).await;

    let (mut rx, handle) = LiveAnnouncementChannel::open(config(url));
    assert_eq!(rx.recv().await, Some(LiveEvent::Opened));

    drop(handle);
    assert_eq!(rx.recv().await, None);
    server.await.unwrap();
}

#[tokio::test]
async fn backoff_reconnects_after_close_and_resets_after_each_open() {
    // One attempt allowed: only the reset after a successful open lets the
    // second and third sessions happen.
    let (url, server) = serve_sessions(vec![
        vec![new_announcement(1)],
        vec![new_announcement(2)],
        vec![new_announcement(3)],
    ])
    .await;

    let (rx, handle) =
        LiveAnnouncementChannel::open(backoff_config(url, 1, Duration::from_millis(10)));
    let events = tokio::time::timeout(Duration::from_secs(10), collect(rx))
        .await
        .expect("channel never gave up");

    let titles: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            LiveEvent::Message(a) => Some(a.title.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(titles, vec!["t1", "t2", "t3"], "{events:?}");
    assert_eq!(events.iter().filter(|e| **e == LiveEvent::Opened).count(), 3);

    let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(terminal.len(), 1, "{events:?}");
    assert!(
        matches!(terminal[0], LiveEvent::Errored(reason) if reason.starts_with("gave up after 1 attempts")),
        "{events:?}"
    );
    assert!(events.last().is_some_and(LiveEvent::is_terminal));
    assert_eq!(handle.state(), ChannelState::Errored);
    server.await.unwrap();
}

#[tokio::test]
async fn backoff_gives_up_once_attempts_are_exhausted() {
    let (rx, handle) = LiveAnnouncementChannel::open(backoff_config(
        refused_url().await,
        2,
        Duration::from_millis(10),
    ));
    let events = tokio::time::timeout(Duration::from_secs(10), collect(rx))
        .await
        .expect("channel never gave up");

    assert_eq!(events.len(), 1, "{events:?}");
    assert!(
        matches!(&events[0], LiveEvent::Errored(reason) if reason.starts_with("gave up after 2 attempts")),
        "{events:?}"
    );
    assert_eq!(handle.state(), ChannelState::Errored);
}

#[tokio::test]
async fn owner_close_during_backoff_stops_without_terminal_event() {
    let (rx, handle) = LiveAnnouncementChannel::open(backoff_config(
        refused_url().await,
        3,
        Duration::from_secs(30),
    ));
    tokio::time::sleep(Duration::from_millis(200)).await;

    handle.close();
    let events = tokio::time::timeout(Duration::from_secs(5), collect(rx))
        .await
        .expect("close did not interrupt the backoff sleep");

    assert!(events.is_empty(), "{events:?}");
    assert_eq!(handle.state(), ChannelState::Closed);
}
