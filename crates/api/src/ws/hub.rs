use std::collections::HashMap;

use agora_core::types::{DbId, Timestamp};
use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

use super::PushEvent;

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::Sender<Message>;

/// Default outbound buffer per connection.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Metadata for a single live connection.
pub struct WsConnection {
    /// The signed-in user this connection belongs to.
    pub user_id: DbId,
    /// Bounded channel feeding the connection's socket writer.
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Result of a fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Connections that accepted the message into their buffer.
    pub delivered: usize,
    /// Connections dropped because their buffer was full or closed.
    pub evicted: usize,
}

/// Registry of live connections keyed by connection ID.
///
/// Sends never wait: a connection whose buffer is full is treated as
/// unresponsive and removed, which closes its channel. Locks are held only
/// for map access.
pub struct Hub {
    connections: RwLock<HashMap<String, WsConnection>>,
    channel_capacity: usize,
}

impl Hub {
    /// Create an empty hub whose connections buffer `channel_capacity`
    /// messages each.
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Register a connection for `user_id`.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn register(&self, conn_id: String, user_id: DbId) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let conn = WsConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection, closing its channel. Returns `false` if it was
    /// already gone (for instance after eviction).
    pub async fn unregister(&self, conn_id: &str) -> bool {
        let Some(conn) = self.connections.write().await.remove(conn_id) else {
            return false;
        };
        let connected_secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
        tracing::debug!(conn_id, user_id = conn.user_id, connected_secs, "Connection unregistered");
        true
    }

    /// Offer `message` to every connection of `user_id` without waiting.
    pub async fn broadcast_to_user(&self, user_id: DbId, message: Message) -> DeliveryReport {
        self.fan_out(Some(user_id), message).await
    }

    /// Serialize `event` and offer it to every connection of `user_id`.
    pub async fn push(
        &self,
        user_id: DbId,
        event: &PushEvent,
    ) -> Result<DeliveryReport, serde_json::Error> {
        let text = serde_json::to_string(event)?;
        Ok(self.broadcast_to_user(user_id, Message::Text(text.into())).await)
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task. Clients that stopped draining their buffer
    /// are evicted here too.
    pub async fn ping_all(&self) -> DeliveryReport {
        self.fan_out(None, Message::Ping(Bytes::new())).await
    }

    /// Return the current number of live connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Number of live connections belonging to `user_id`.
    pub async fn user_connection_count(&self, user_id: DbId) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|conn| conn.user_id == user_id)
            .count()
    }

    /// Drop every connection belonging to `user_id`. Returns how many were
    /// removed.
    pub async fn disconnect_user(&self, user_id: DbId) -> usize {
        let mut conns = self.connections.write().await;
        let before = conns.len();
        conns.retain(|_, conn| {
            if conn.user_id == user_id {
                let _ = conn.sender.try_send(Message::Close(None));
                false
            } else {
                true
            }
        });
        before - conns.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.try_send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    async fn fan_out(&self, user_id: Option<DbId>, message: Message) -> DeliveryReport {
        let mut conns = self.connections.write().await;
        let mut report = DeliveryReport::default();

        conns.retain(|conn_id, conn| {
            if user_id.is_some_and(|id| id != conn.user_id) {
                return true;
            }
            match conn.sender.try_send(message.clone()) {
                Ok(()) => {
                    report.delivered += 1;
                    true
                }
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(conn_id = %conn_id, user_id = conn.user_id, "Evicting slow WebSocket consumer");
                    report.evicted += 1;
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(conn_id = %conn_id, user_id = conn.user_id, "Dropping closed WebSocket channel");
                    report.evicted += 1;
                    false
                }
            }
        });

        report
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}
