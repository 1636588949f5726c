use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use super::domain::ReviewRequest;
use super::service::ReviewBoard;
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::extract::Payload;
use crate::marketplace::ids::{AccountId, ReviewId};

pub fn review_router(board: Arc<ReviewBoard>) -> Router {
    Router::new()
        .route("/api/v1/reviews", post(post_review_handler))
        .route("/api/v1/agents/:agent_id/reviews", get(agent_reviews_handler))
        .route(
            "/api/v1/admin/reviews/:review_id/flag",
            patch(flag_review_handler),
        )
        .with_state(board)
}

pub(crate) async fn post_review_handler(
    State(board): State<Arc<ReviewBoard>>,
    principal: Principal,
    Payload(request): Payload<ReviewRequest>,
) -> Result<Response, MarketplaceError> {
    let review = board.post(
        &principal,
        request.agent_id,
        request.rating,
        request.comment,
    )?;
    Ok((StatusCode::CREATED, Json(review)).into_response())
}

pub(crate) async fn agent_reviews_handler(
    State(board): State<Arc<ReviewBoard>>,
    _principal: Principal,
    Path(agent_id): Path<u64>,
) -> Result<Response, MarketplaceError> {
    let reviews = board.list_for_agent(AccountId(agent_id))?;
    Ok((StatusCode::OK, Json(reviews)).into_response())
}

pub(crate) async fn flag_review_handler(
    State(board): State<Arc<ReviewBoard>>,
    principal: Principal,
    Path(review_id): Path<u64>,
) -> Result<Response, MarketplaceError> {
    let review = board.flag(&principal, ReviewId(review_id))?;
    Ok((StatusCode::OK, Json(review)).into_response())
}
