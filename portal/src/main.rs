//! Headless portal binary: runs the announcements view in a terminal.
//!
//! Notifications are logged instead of displayed and push is unavailable.
//! Commands typed on stdin drive the view (see `commands`).

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use academy_portal_lib::BackgroundNotificationHandler;
use academy_portal_lib::app::SharedState;
use academy_portal_lib::commands::{self, parse_command};
use academy_portal_lib::platform::headless::HeadlessHost;
use academy_portal_lib::{shutdown, view};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting academy portal (headless mode)");

    let config = academy_portal_lib::init_foundation()?;
    let course_id = std::env::args()
        .nth(1)
        .or_else(|| config.course_id.clone())
        .ok_or_else(|| anyhow::anyhow!("no course id: pass one or set ACADEMY_COURSE_ID"))?;

    let host = Arc::new(HeadlessHost::new(config.notification_permission));
    let state = SharedState::new(config, host.clone(), host)?;

    let (worker, worker_task) =
        BackgroundNotificationHandler::start(state.surface(), state.shutdown_token().clone());

    let mut ui_rx = state.ui().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = ui_rx.recv().await {
            tracing::info!(event = event.name, payload = %event.payload, "UI event");
        }
    });

    if view::mount(state.view(), &course_id).await.is_none() {
        tracing::warn!(course_id = %course_id, "Live updates not started");
    }
    tracing::info!(
        course_id = %course_id,
        reconnect = state.reconnects(),
        "Announcements view mounted. Type commands or press Ctrl+C to stop."
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line(), if stdin_open => {
                // Without a console keep running until Ctrl+C.
                let Ok(Some(line)) = line else {
                    stdin_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(command) => {
                        if !commands::execute(&state, &worker, command).await {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("{e}"),
                }
            }
        }
    }

    tracing::info!("Shutting down...");
    shutdown::graceful_shutdown(&state).await;
    drop(worker);
    let _ = worker_task.await;
    Ok(())
}
