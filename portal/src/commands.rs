//! Console commands for the headless binary.
//!
//! Each stdin line maps to one view or background-handler operation, so a
//! terminal user can drive the same paths a rendered page would.

use std::sync::Arc;

use announcement_store::AnnouncementId;

use crate::app::SharedState;
use crate::notification::worker::WorkerHandle;
use crate::platform::{NotificationData, NotificationId};
use crate::view;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Refresh,
    Read(AnnouncementId),
    Join(AnnouncementId),
    Click(NotificationId),
    /// Click on a notification shown by the background handler.
    BackgroundClick(NotificationId, Option<String>),
    OpenMeeting,
    CopyLink,
    CloseMeeting,
    Course(String),
    /// Simulated push delivery handled by the background handler.
    Push(Option<String>),
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };
    let need_arg = |what: &str| required(name, arg, what);

    match name {
        "list" | "ls" => Ok(Command::List),
        "refresh" => Ok(Command::Refresh),
        "read" => Ok(Command::Read(parse_id(need_arg("announcement id")?))),
        "join" => Ok(Command::Join(parse_id(need_arg("announcement id")?))),
        "click" => need_arg("notification id")?
            .parse()
            .map(|n| Command::Click(NotificationId(n)))
            .map_err(|_| format!("click: invalid notification id '{arg}'")),
        "bgclick" => {
            let (id, url) = match need_arg("notification id")?.split_once(char::is_whitespace) {
                Some((id, url)) => (id, Some(url.trim().to_string())),
                None => (arg, None),
            };
            id.parse()
                .map(|n| Command::BackgroundClick(NotificationId(n), url))
                .map_err(|_| format!("bgclick: invalid notification id '{id}'"))
        }
        "open" => Ok(Command::OpenMeeting),
        "copy" => Ok(Command::CopyLink),
        "close" => Ok(Command::CloseMeeting),
        "course" => Ok(Command::Course(need_arg("course id")?.to_string())),
        "push" => Ok(Command::Push(
            Some(arg.to_string()).filter(|a| !a.is_empty()),
        )),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err("empty command".into()),
        other => Err(format!("unknown command '{other}'")),
    }
}

fn required<'a>(name: &str, arg: &'a str, what: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("{name}: missing {what}"))
    } else {
        Ok(arg)
    }
}

fn parse_id(arg: &str) -> AnnouncementId {
    arg.parse::<i64>()
        .map(AnnouncementId::Int)
        .unwrap_or_else(|_| AnnouncementId::Text(arg.to_string()))
}

/// Run one command. Returns `false` when the console should stop.
pub async fn execute(state: &SharedState, worker: &WorkerHandle, command: Command) -> bool {
    match command {
        Command::List => {
            let v = state.view().lock().await;
            for a in v.announcements() {
                tracing::info!(
                    id = %a.id,
                    kind = a.kind.as_str(),
                    unread = a.is_unread(),
                    link = ?a.join_link(),
                    "{}",
                    a.title
                );
            }
            tracing::info!(
                course_id = ?v.course_id(),
                count = v.announcements().len(),
                unread = v.store().unread_count(),
                live_unavailable = v.live_unavailable(),
                "Announcements"
            );
        }
        Command::Refresh => {
            // A slow backend must not block the console.
            let view = Arc::clone(state.view());
            tokio::spawn(async move {
                let shown = view::refresh(&view).await;
                tracing::info!(notified = shown, "Refreshed");
            });
        }
        Command::Read(id) => {
            if !view::mark_read(state.view(), &id).await {
                tracing::info!(announcement_id = %id, "Nothing to mark read");
            }
        }
        Command::Join(id) => {
            if !state.view().lock().await.open_meeting_for(&id) {
                tracing::info!(announcement_id = %id, "Announcement has no class link");
            }
        }
        Command::Click(id) => view::handle_notification_click(state.view(), id).await,
        Command::BackgroundClick(id, url) => {
            if let Err(e) = worker
                .notification_click(id, NotificationData { url })
                .await
            {
                tracing::warn!(error = %e, "Notification click not delivered");
            }
        }
        Command::OpenMeeting => {
            view::join_meeting(state.view()).await;
        }
        Command::CopyLink => {
            view::copy_meeting_link(state.view()).await;
        }
        Command::CloseMeeting => state.view().lock().await.close_meeting(),
        Command::Course(course_id) => {
            if view::change_course(state.view(), &course_id).await.is_none() {
                tracing::warn!(course_id = %course_id, "Live updates not started for course");
            }
        }
        Command::Push(payload) => {
            let payload = payload.map(String::into_bytes);
            if let Err(e) = worker.push(payload).await {
                tracing::warn!(error = %e, "Push delivery failed");
            }
        }
        Command::Quit => return false,
    }
    true
}
