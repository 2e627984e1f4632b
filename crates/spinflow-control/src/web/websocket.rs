//! WebSocket feed of visual frames
//!
//! Each animator tick publishes a [`VisualFrame`] on a broadcast channel;
//! every connected client receives it as JSON. Slow clients skip frames
//! rather than stalling the feed.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, trace, warn};

use spinflow_core::VisualFrame;

use super::server::AppState;

/// WebSocket message from client to server
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsClientMessage {
    #[serde(rename = "ping")]
    Ping,
}

/// WebSocket message from server to client
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsServerMessage {
    #[serde(rename = "frame")]
    Frame { frame: VisualFrame },
    #[serde(rename = "pong")]
    Pong,
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut frames = state.frames.subscribe();

    info!("WebSocket client connected");

    let forward_task = tokio::spawn(async move {
        loop {
            let frame = match frames.recv().await {
                Ok(frame) => frame,
                Err(RecvError::Lagged(skipped)) => {
                    // A slow client only ever needs the newest frame.
                    debug!(skipped, "WebSocket client lagged, skipping frames");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let message = WsServerMessage::Frame { frame };
            let Ok(json) = serde_json::to_string(&message) else {
                break;
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                if let Err(e) = handle_text_message(&text) {
                    warn!("error handling WebSocket message: {e}");
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket client disconnected");
                break;
            }
            Err(e) => {
                warn!("WebSocket error: {e}");
                break;
            }
            _ => {}
        }
    }

    forward_task.abort();
}

/// Handle a text message from the client
fn handle_text_message(text: &str) -> Result<(), String> {
    let message: WsClientMessage =
        serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {e}"))?;

    match message {
        WsClientMessage::Ping => {
            trace!("WebSocket ping");
        }
    }

    Ok(())
}
