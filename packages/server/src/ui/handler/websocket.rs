//! WebSocket connection handlers.
//!
//! Every connection gets two tasks: a reader that decodes frames and feeds them
//! to the shared dispatcher, and the single writer that drains the connection's
//! outbound queue. When either ends, the other is stopped and the connection's
//! registry entry is released.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitStream, StreamExt},
};
use kairo_shared::{Command, HandlerError, wire};
use tokio::sync::mpsc;

use crate::{ui::state::AppState, usecase::ConnectionContext};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, receiver) = socket.split();
    tracing::info!("WebSocket connection opened");

    // Outbound queue for this client; broadcasts from any connection land here
    let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
    let context = Arc::new(ConnectionContext::new(tx));

    // Spawn the single writer for this client
    let mut send_task = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            let frame = match wire::encode(&command) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("Failed to encode {} command: {}", command.command_type(), e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(frame.into())).await {
                tracing::debug!("WebSocket write failed: {}", e);
                break;
            }
        }
    });

    // Spawn a task to read commands from this client
    let recv_state = state.clone();
    let recv_context = context.clone();
    let mut recv_task =
        tokio::spawn(async move { read_loop(receiver, &recv_state, &recv_context).await });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Implicit LOGOUT for whatever id this connection was bound to
    if state.disconnect.execute(&context).await.is_none() {
        tracing::info!("WebSocket connection closed");
    }
}

async fn read_loop(
    mut receiver: SplitStream<WebSocket>,
    state: &AppState,
    context: &ConnectionContext,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!("WebSocket error: {}", e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received frame: {}", text.as_str());

                let command = match wire::decode(text.as_str()) {
                    Ok(command) => command,
                    Err(e) => {
                        tracing::warn!("Dropping frame: {}", e);
                        continue;
                    }
                };

                match state.dispatcher.dispatch(&command, context).await {
                    Ok(_) => {}
                    Err(HandlerError::ChannelClosed) => {
                        tracing::warn!("Outbound channel closed, ending read loop");
                        break;
                    }
                }
            }
            Message::Ping(_) => {
                tracing::debug!("Received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Client requested close");
                break;
            }
            _ => {}
        }
    }
}
