use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection. Viewers and players speak the same
/// protocol; phase guards are the only access control.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before taking the snapshot so no update can fall in between;
    // late joiners converge immediately.
    let mut updates = state.subscribe();

    tracing::info!("Client connected ({} watching)", state.updates.receiver_count());

    let snapshot = ServerMessage::StateUpdate {
        state: state.snapshot().await,
    };
    if let Ok(json) = serde_json::to_string(&snapshot) {
        if sender.send(Message::Text(json.into())).await.is_err() {
            tracing::error!("Failed to send initial snapshot");
            return;
        }
    }

    loop {
        tokio::select! {
            // Fan out committed state changes
            update = updates.recv() => {
                match update {
                    Ok(msg) => {
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Later snapshots carry the full state, so a slow
                        // client converges on the next one.
                        tracing::warn!("Client lagged, skipped {} updates", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            // Handle client events
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => handle_message(client_msg, &state).await,
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // Dropping the subscription removes this peer from the broadcast set;
    // a disconnecting player does not pause or forfeit the round.
    tracing::info!("Client disconnected");
}

/// Dispatch one client event into the state machine. Events arriving in the
/// wrong phase are dropped by the guards without a reply; the slot a client
/// claims is taken as given.
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) {
    match msg {
        ClientMessage::StartGame => Arc::clone(state).start_game().await,
        ClientMessage::ResetGame => state.reset_game().await,
        ClientMessage::UpdatePrompt { player_id, prompt } => {
            state.update_prompt(player_id, prompt).await
        }
        ClientMessage::SelectImage {
            player_id,
            image_id,
        } => state.select_image(player_id, image_id).await,
    }
}
