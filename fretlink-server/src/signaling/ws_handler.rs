use crate::api::AppState;
use crate::room::{JoinOutcome, RoomCommand};
use crate::signaling::{SignalingOutput, WsOutput};
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use fretlink_core::{Role, RoomId, SignalMessage};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub const UNAUTHORIZED: &str = "Unauthorized: Invalid token";
pub const INVALID_ROOM_OR_ROLE: &str = "Invalid room or role";

/// Fields of the opening JOIN frame. `role` is `None` when unrecognised.
#[derive(Debug, PartialEq)]
struct JoinRequest {
    room_id: String,
    role: Option<Role>,
    token: String,
}

/// Returns `None` unless `text` is a JSON object of type `JOIN`.
fn parse_join(text: &str) -> Option<JoinRequest> {
    let value: Value = serde_json::from_str(text).ok()?;
    if value.get("type").and_then(Value::as_str) != Some("JOIN") {
        return None;
    }

    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(JoinRequest {
        room_id: RoomId::sanitize(&field("roomId")),
        role: field("role").parse().ok(),
        token: field("token"),
    })
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    debug!("New WebSocket connection {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let output = Arc::new(WsOutput::new(tx));

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let Some(request) = first_join(&mut receiver).await else {
        info!("Connection {} did not open with JOIN, closing", connection_id);
        output.close().await;
        let _ = send_task.await;
        return;
    };

    if state.config.require_tokens && !state.tokens.validate(&request.room_id, &request.token) {
        warn!("Rejected JOIN for room '{}': invalid token", request.room_id);
        refuse(&output, UNAUTHORIZED).await;
        let _ = send_task.await;
        return;
    }

    let role = match request.role {
        Some(role) if !request.room_id.is_empty() => role,
        _ => {
            refuse(&output, INVALID_ROOM_OR_ROLE).await;
            let _ = send_task.await;
            return;
        }
    };
    let room_id = request.room_id;

    let membership = state
        .rooms
        .join(&room_id, role, connection_id, output.clone())
        .await;
    let room_tx = match membership {
        Some(m) if m.outcome == JoinOutcome::Joined => m.room_tx,
        Some(_) => {
            output.close().await;
            let _ = send_task.await;
            return;
        }
        None => {
            error!("Room {} could not be started", room_id);
            output.close().await;
            let _ = send_task.await;
            return;
        }
    };

    let mut recv_task = tokio::spawn({
        let room_tx = room_tx.clone();
        let room_id = room_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match SignalMessage::decode(text.as_str()) {
                        Ok(message) => {
                            let cmd = RoomCommand::Relay {
                                from: role,
                                connection_id,
                                message,
                            };
                            if let Err(e) = room_tx.send(cmd).await {
                                error!("Room {} died: {}", room_id, e);
                                break;
                            }
                        }
                        Err(e) => warn!("[{}] Invalid signal from {}: {}", room_id, role, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    let _ = room_tx
        .send(RoomCommand::Leave {
            role,
            connection_id,
        })
        .await;
    info!("[{}] WebSocket of {} closed", room_id, role);
}

async fn first_join(receiver: &mut futures::stream::SplitStream<WebSocket>) -> Option<JoinRequest> {
    loop {
        match receiver.next().await? {
            Ok(Message::Text(text)) => return parse_join(text.as_str()),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            _ => return None,
        }
    }
}

async fn refuse(output: &WsOutput, message: &str) {
    output.send(SignalMessage::error(message)).await;
    output.close().await;
}
