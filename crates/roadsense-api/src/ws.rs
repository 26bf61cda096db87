use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::info;

use crate::state::AppState;

/// Registers the socket as a live subscriber. There is no client-initiated
/// protocol beyond connect/disconnect: the socket only receives unsolicited
/// batch pushes.
pub async fn subscribe(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let id = state.registry.add(tx).await;
    info!(subscriber = %id, "subscriber connected");

    let mut push_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Drain inbound frames so close handshakes complete; content is ignored.
    let mut drain_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut push_task => drain_task.abort(),
        _ = &mut drain_task => push_task.abort(),
    }

    state.registry.remove(id).await;
    info!(subscriber = %id, "subscriber disconnected");
}
