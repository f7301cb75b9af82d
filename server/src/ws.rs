use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, OwnedSemaphorePermit, Semaphore};

use crate::game_loop::{GameBroadcast, GameCommand};
use crate::protocol::{ClientMsg, ServerMsg};

/// Text frames above this size get the session disconnected.
pub const MAX_MESSAGE_BYTES: usize = 1024;

/// Parse failures tolerated before the session is disconnected.
pub const MAX_PARSE_ERRORS: u32 = 5;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub broadcast_tx: broadcast::Sender<GameBroadcast>,
    pub connection_semaphore: Arc<Semaphore>,
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    match app_state.connection_semaphore.clone().try_acquire_owned() {
        Ok(permit) => ws
            .on_upgrade(move |socket| handle_socket(socket, app_state, permit))
            .into_response(),
        Err(_) => {
            tracing::warn!("Connection refused: server full");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

async fn handle_socket(socket: WebSocket, app_state: AppState, _permit: OwnedSemaphorePermit) {
    let (mut sink, mut stream) = socket.split();

    // Bind this session to a player entity
    let (resp_tx, resp_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::Join { response: resp_tx })
        .await
        .is_err()
    {
        tracing::error!("Failed to send Join command");
        return;
    }

    let (my_id, current_players) = match resp_rx.await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Failed to receive join response");
            return;
        }
    };

    tracing::info!("Player {} connected", my_id);

    // Full-state catch-up before anything else
    let catch_up = serde_json::to_string(&ServerMsg::CurrentPlayers(current_players)).unwrap();
    if sink.send(Message::Text(catch_up.into())).await.is_err() {
        let _ = app_state.game_tx.send(GameCommand::Leave { id: my_id }).await;
        return;
    }

    // Subscribe to broadcasts
    let mut broadcast_rx = app_state.broadcast_tx.subscribe();
    let mut parse_errors: u32 = 0;

    loop {
        tokio::select! {
            // Client -> Server
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > MAX_MESSAGE_BYTES {
                            tracing::warn!("Player {} sent oversized message, disconnecting", my_id);
                            break;
                        }
                        match serde_json::from_str::<ClientMsg>(&text) {
                            Ok(client_msg) => {
                                let cmd = match client_msg {
                                    ClientMsg::PlayerMove { x, y } => {
                                        GameCommand::Move { id: my_id, x, y }
                                    }
                                    // attribution always comes from the
                                    // session, never the claimed ownerId
                                    ClientMsg::BulletFired { position, velocity, .. } => {
                                        GameCommand::Fire { id: my_id, position, velocity }
                                    }
                                    ClientMsg::GrenadeThrown { position, .. } => {
                                        GameCommand::ThrowGrenade { id: my_id, position }
                                    }
                                    ClientMsg::PlayerRespawn => {
                                        GameCommand::Respawn { id: my_id }
                                    }
                                };
                                if app_state.game_tx.send(cmd).await.is_err() {
                                    break;
                                }
                            }
                            Err(_) => {
                                // malformed input never mutates state
                                parse_errors += 1;
                                if parse_errors >= MAX_PARSE_ERRORS {
                                    tracing::warn!(
                                        "Player {} exceeded parse error limit, disconnecting",
                                        my_id
                                    );
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {} // Ignore ping/pong/binary
                }
            }

            // Server -> Client (broadcast)
            result = broadcast_rx.recv() => {
                match result {
                    Ok(broadcast) => {
                        let msg = match broadcast {
                            GameBroadcast::All(msg) => msg,
                            GameBroadcast::Except { player_id, msg } => {
                                if player_id == my_id {
                                    continue; // Not for this client
                                }
                                msg
                            }
                        };

                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Player {} lagged by {} messages", my_id, n);
                        // Continue - gameState is stateless, dropping is fine
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    // Cleanup on disconnect, before any further broadcast is written
    let _ = app_state.game_tx.send(GameCommand::Leave { id: my_id }).await;
    tracing::info!("Player {} disconnected", my_id);
}
