use std::sync::Arc;

use axum::extract::ws::{Message as Frame, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tracing::debug;

use super::domain::MessagePayload;
use super::relay::{ChatRelay, RoomSubscription};
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::extract::Payload;
use crate::marketplace::ids::RoomId;

pub fn chat_router(relay: Arc<ChatRelay>) -> Router {
    Router::new()
        .route("/api/v1/chats", get(rooms_handler))
        .route(
            "/api/v1/chats/:room_id/messages",
            get(list_messages_handler).post(post_message_handler),
        )
        .route("/api/v1/chats/:room_id/ws", get(socket_handler))
        .with_state(relay)
}

pub(crate) async fn rooms_handler(
    State(relay): State<Arc<ChatRelay>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let rooms = relay.rooms_for(&principal)?;
    let payload = json!({
        "total": rooms.len(),
        "chats": rooms,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

pub(crate) async fn list_messages_handler(
    State(relay): State<Arc<ChatRelay>>,
    principal: Principal,
    Path(room_id): Path<u64>,
) -> Result<Response, MarketplaceError> {
    let messages = relay.list_messages(&principal, RoomId(room_id))?;
    let payload = json!({
        "room_id": room_id,
        "messages": messages,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

pub(crate) async fn post_message_handler(
    State(relay): State<Arc<ChatRelay>>,
    principal: Principal,
    Path(room_id): Path<u64>,
    Payload(payload): Payload<MessagePayload>,
) -> Result<Response, MarketplaceError> {
    let content = payload.content.unwrap_or_default();
    let message = relay.post_message(&principal, RoomId(room_id), &content)?;
    Ok((StatusCode::CREATED, Json(message)).into_response())
}

/// Membership is checked before the upgrade so outsiders get a plain 403/404.
pub(crate) async fn socket_handler(
    State(relay): State<Arc<ChatRelay>>,
    principal: Principal,
    Path(room_id): Path<u64>,
    upgrade: WebSocketUpgrade,
) -> Result<Response, MarketplaceError> {
    let subscription = relay.subscribe(&principal, RoomId(room_id))?;
    Ok(upgrade.on_upgrade(move |socket| relay_socket(relay, principal, subscription, socket)))
}

async fn relay_socket(
    relay: Arc<ChatRelay>,
    principal: Principal,
    mut subscription: RoomSubscription,
    socket: WebSocket,
) {
    let room_id = subscription.room_id();
    let (mut outbound, mut inbound) = socket.split();
    debug!(room = %room_id, participant = %principal.account_id, "chat socket connected");

    loop {
        tokio::select! {
            delivered = subscription.next() => {
                let Some(message) = delivered else { break };
                let Ok(text) = serde_json::to_string(&message) else { continue };
                if outbound.send(Frame::Text(text)).await.is_err() {
                    break;
                }
            }
            received = inbound.next() => {
                match received {
                    Some(Ok(Frame::Text(text))) => {
                        let posted = serde_json::from_str::<MessagePayload>(&text)
                            .map_err(|err| MarketplaceError::validation(err.to_string()))
                            .and_then(|payload| {
                                let content = payload.content.unwrap_or_default();
                                relay.post_message(&principal, room_id, &content)
                            });
                        // Successful posts come back through the subscription.
                        if let Err(err) = posted {
                            let frame = json!({ "error": err.kind(), "message": err.to_string() });
                            if outbound.send(Frame::Text(frame.to_string())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Frame::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    debug!(room = %room_id, participant = %principal.account_id, "chat socket closed");
}
