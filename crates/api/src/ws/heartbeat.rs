use std::sync::Arc;
use std::time::Duration;

use super::Hub;

/// Interval between heartbeat pings.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Spawn a background task that pings every live connection.
///
/// Runs for the life of the process; abort the returned handle on shutdown.
pub fn start_heartbeat(hub: Arc<Hub>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);

        loop {
            interval.tick().await;
            let report = hub.ping_all().await;
            tracing::debug!(
                delivered = report.delivered,
                evicted = report.evicted,
                "WebSocket heartbeat ping"
            );
        }
    })
}
