//! Periodic removal of expired sessions.
//!
//! Validation already deletes an expired session when its cookie comes back;
//! this job catches the ones whose owners never return.

use std::time::Duration;

use agora_db::repositories::SessionRepo;
use agora_db::DbPool;
use chrono::Utc;

/// How often the cleanup job runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Delete expired sessions once. Returns the number removed.
pub async fn run_once(pool: &DbPool) -> Result<u64, sqlx::Error> {
    SessionRepo::delete_expired(pool, Utc::now()).await
}

/// Run the cleanup loop until the task is aborted.
pub async fn run(pool: DbPool, interval: Duration) {
    tracing::info!(interval_secs = interval.as_secs(), "Session cleanup job started");

    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        match run_once(&pool).await {
            Ok(0) => tracing::debug!("Session cleanup: nothing to purge"),
            Ok(deleted) => tracing::info!(deleted, "Session cleanup: purged expired sessions"),
            Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
        }
    }
}
