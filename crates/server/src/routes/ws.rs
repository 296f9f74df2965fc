use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::task::JoinHandle;

use movie_explorer_core::models::BrowseSnapshot;

use crate::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn state_message(snapshot: &BrowseSnapshot) -> Message {
    let msg = json!({ "type": "browse_state", "payload": snapshot });
    Message::Text(msg.to_string().into())
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut rx = state.coordinator.subscribe();

    // Push the current snapshot, then every change after it
    let send_task = tokio::spawn(async move {
        let current = rx.borrow_and_update().clone();
        if sender.send(state_message(&current)).await.is_err() {
            return;
        }
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            if sender.send(state_message(&snapshot)).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received WS message: {}", text);
                }
                Message::Close(_) => {
                    tracing::debug!("Client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    join_first(send_task, recv_task).await;

    tracing::debug!("WebSocket connection closed");
}

/// Waits for either task to finish and aborts the other one
async fn join_first(mut send_task: JoinHandle<()>, mut recv_task: JoinHandle<()>) {
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
}
