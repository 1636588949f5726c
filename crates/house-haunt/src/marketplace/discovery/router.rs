use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use super::service::Discovery;
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;

pub fn discovery_router(discovery: Arc<Discovery>) -> Router {
    Router::new()
        .route("/api/v1/discover/recommendations", get(recommendations_handler))
        .route("/api/v1/discover/trending", get(trending_handler))
        .with_state(discovery)
}

pub(crate) async fn recommendations_handler(
    State(discovery): State<Arc<Discovery>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let recommendations = discovery.recommendations(&principal)?;
    Ok((StatusCode::OK, Json(recommendations)).into_response())
}

pub(crate) async fn trending_handler(
    State(discovery): State<Arc<Discovery>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let trending = discovery.trending(&principal)?;
    Ok((StatusCode::OK, Json(trending)).into_response())
}
