use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use super::service::SessionService;

/// Periodically purges expired sessions. Runs until the task is aborted.
#[instrument(skip(session_service))]
pub async fn start_cleanup_task(session_service: Arc<SessionService>, every: Duration) {
    info!(
        cleanup_interval_secs = every.as_secs(),
        "Starting session cleanup background task"
    );

    let mut cleanup_interval = interval(every);

    loop {
        cleanup_interval.tick().await;

        if let Err(e) = session_service.cleanup_expired_sessions().await {
            error!(error = %e, "Session cleanup task failed");
        }
    }
}
