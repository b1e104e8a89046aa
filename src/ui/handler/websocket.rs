//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::domain::{ClientId, MessagePushError};
use crate::infrastructure::dto::websocket::{ClientEvent, ServerEvent};

use super::super::state::AppState;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub client_id: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let client_id_str = query.client_id;

    // Convert String -> ClientId (Domain Model)
    let client_id = match ClientId::try_from(client_id_str.clone()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid client_id format: '{}'", client_id_str);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // Register the channel; duplicates are rejected before the upgrade
    match state.pusher.register_client(client_id.clone(), tx).await {
        Ok(()) => {}
        Err(MessagePushError::AlreadyRegistered(_)) => {
            tracing::warn!(
                "Client with ID '{}' is already connected. Rejecting connection.",
                client_id_str
            );
            return Err(StatusCode::CONFLICT);
        }
        Err(e) => {
            tracing::error!("Failed to register client '{}': {}", client_id_str, e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    tracing::info!("Client '{}' connected and registered", client_id_str);

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, client_id, rx)))
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This handles the outbound flow: events addressed to this client (via its
/// pusher channel) are written to its WebSocket connection.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this client
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    client_id: ClientId,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (mut sender, mut receiver) = socket.split();

    // Greet the new connection with its own identity
    {
        let welcome = ServerEvent::Welcome {
            client_id: client_id.as_str().to_string(),
        };
        if let Err(e) = sender.send(Message::Text(welcome.to_json().into())).await {
            tracing::error!(
                "Failed to send welcome to '{}': {}",
                client_id.as_str(),
                e
            );
            state.pusher.unregister_client(&client_id).await;
            return;
        }
    }

    let client_id_for_recv = client_id.clone();
    let state_for_recv = state.clone();

    // Spawn a task to receive messages from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!(
                        "Received from '{}': {}",
                        client_id_for_recv.as_str(),
                        text
                    );

                    match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => {
                            // Errors are contained inside the dispatcher and
                            // reported back to this client only
                            state_for_recv
                                .dispatcher
                                .dispatch(&client_id_for_recv, event)
                                .await;
                        }
                        Err(e) => {
                            tracing::warn!("Failed to parse message as event: {}", e);
                            state_for_recv
                                .dispatcher
                                .report_parse_error(&client_id_for_recv)
                                .await;
                        }
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", client_id_for_recv.as_str());
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to receive messages from other clients and send to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Leave the joined room (broadcasting member-left to the remaining
    // members) and release the pusher channel
    state.dispatcher.handle_disconnect(&client_id).await;
    tracing::info!(
        "Client '{}' disconnected and removed from registry",
        client_id.as_str()
    );
}
