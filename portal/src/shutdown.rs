use std::time::Duration;

use tokio::time::sleep;

use crate::app::SharedState;

pub async fn graceful_shutdown(state: &SharedState) {
    tracing::info!("Shutdown sequence started");

    state.view().lock().await.unmount();
    tracing::info!("Shutdown: live channel closed");

    state.shutdown_token().cancel();
    tracing::info!("Shutdown: background notification handler cancelled");

    sleep(Duration::from_millis(200)).await;
    tracing::info!("Shutdown sequence completed");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use announcement_store::NotificationPermission;

    use super::*;
    use crate::config::AppConfig;
    use crate::testing::FakeHost;

    #[tokio::test]
    async fn cancels_token_and_unmounts() {
        let host = Arc::new(FakeHost::new(NotificationPermission::Granted));
        let state = SharedState::new(AppConfig::default(), host.clone(), host).unwrap();
        state.view().lock().await.begin("42");

        graceful_shutdown(&state).await;

        assert!(state.shutdown_token().is_cancelled());
        assert_eq!(state.view().lock().await.course_id(), None);
    }
}
