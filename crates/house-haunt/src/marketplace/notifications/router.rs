use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use serde_json::json;

use super::service::NotificationOutbox;
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::ids::NotificationId;

pub fn notification_router(outbox: Arc<NotificationOutbox>) -> Router {
    Router::new()
        .route(
            "/api/v1/notifications",
            get(inbox_handler).delete(clear_handler),
        )
        .route("/api/v1/notifications/read-all", patch(mark_all_handler))
        .route("/api/v1/notifications/:notification_id/read", patch(mark_read_handler))
        .route("/api/v1/notifications/:notification_id", delete(delete_handler))
        .with_state(outbox)
}

pub(crate) async fn inbox_handler(
    State(outbox): State<Arc<NotificationOutbox>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let inbox = outbox.inbox(&principal)?;
    Ok((StatusCode::OK, Json(inbox)).into_response())
}

pub(crate) async fn mark_read_handler(
    State(outbox): State<Arc<NotificationOutbox>>,
    principal: Principal,
    Path(notification_id): Path<u64>,
) -> Result<Response, MarketplaceError> {
    let notification = outbox.mark_read(&principal, NotificationId(notification_id))?;
    Ok((StatusCode::OK, Json(notification)).into_response())
}

pub(crate) async fn mark_all_handler(
    State(outbox): State<Arc<NotificationOutbox>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let updated = outbox.mark_all_read(&principal)?;
    Ok((StatusCode::OK, Json(json!({ "updated": updated }))).into_response())
}

pub(crate) async fn delete_handler(
    State(outbox): State<Arc<NotificationOutbox>>,
    principal: Principal,
    Path(notification_id): Path<u64>,
) -> Result<Response, MarketplaceError> {
    outbox.delete(&principal, NotificationId(notification_id))?;
    Ok((StatusCode::OK, Json(json!({ "deleted": notification_id }))).into_response())
}

pub(crate) async fn clear_handler(
    State(outbox): State<Arc<NotificationOutbox>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let cleared = outbox.clear_all(&principal)?;
    Ok((StatusCode::OK, Json(json!({ "cleared": cleared }))).into_response())
}
