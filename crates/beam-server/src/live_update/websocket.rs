//! WebSocket handler for live diagram updates.
//!
//! Handles WebSocket connections and forwards update messages to clients.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast;

use crate::state::AppState;

/// Handle WebSocket upgrade for live updates.
pub(crate) async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut receiver = state.broadcaster.subscribe();

    // A fresh session sees the current document state immediately instead of
    // waiting for the next file change.
    if state.document.is_some()
        && let Some(snapshot) = state.broadcaster.snapshot()
    {
        let msg = serde_json::to_string(&snapshot).unwrap();
        if socket.send(Message::Text(msg.into())).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            // Forward update messages to client
            result = receiver.recv() => {
                match result {
                    Ok(message) => {
                        let msg = serde_json::to_string(&message).unwrap();
                        if socket.send(Message::Text(msg.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                }
            }
            // Handle client messages (for keepalive)
            result = socket.recv() => {
                match result {
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }
}
