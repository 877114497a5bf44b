use std::sync::Arc;

use agora_core::types::DbId;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::ws::hub::Hub;

/// GET /api/v1/ws
///
/// Upgrades a signed-in user's connection to a WebSocket and registers it
/// with the hub. Guests are rejected with 401 before the upgrade.
pub async fn ws_handler(
    auth: AuthUser,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let hub = Arc::clone(&state.hub);
    ws.on_upgrade(move |socket| handle_socket(socket, hub, auth.user_id))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with the hub.
///   2. Spawns a sender task that forwards messages from the hub channel.
///   3. Reads inbound frames until the client leaves or the hub drops the
///      connection.
///   4. Unregisters on the way out.
async fn handle_socket(socket: WebSocket, hub: Arc<Hub>, user_id: DbId) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket connected");

    let mut rx = hub.register(conn_id.clone(), user_id).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: ends when the hub drops the channel (unregister, eviction
    // or shutdown) or the socket fails.
    let sender_conn_id = conn_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
        let _ = sink.close().await;
    });

    loop {
        tokio::select! {
            _ = &mut send_task => {
                tracing::debug!(conn_id = %conn_id, "Outbound channel closed");
                break;
            }
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Pong(_))) => {
                    tracing::trace!(conn_id = %conn_id, "Pong received");
                }
                // Clients have nothing to say beyond keepalives.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    }

    hub.unregister(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id, "WebSocket disconnected");
}
