use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use super::service::{FavoriteShelf, ToggleOutcome};
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::ids::ListingId;

pub fn favorite_router(shelf: Arc<FavoriteShelf>) -> Router {
    Router::new()
        .route("/api/v1/favorites", get(list_favorites_handler))
        .route("/api/v1/favorites/:listing_id", post(toggle_favorite_handler))
        .with_state(shelf)
}

pub(crate) async fn toggle_favorite_handler(
    State(shelf): State<Arc<FavoriteShelf>>,
    principal: Principal,
    Path(listing_id): Path<u64>,
) -> Result<Response, MarketplaceError> {
    let outcome = shelf.toggle(&principal, ListingId(listing_id))?;
    let (status, message) = match outcome {
        ToggleOutcome::Added => (StatusCode::CREATED, "Added to favorites."),
        ToggleOutcome::Removed => (StatusCode::OK, "Removed from favorites."),
    };
    let payload = json!({
        "outcome": outcome,
        "listing_id": listing_id,
        "message": message,
    });
    Ok((status, Json(payload)).into_response())
}

pub(crate) async fn list_favorites_handler(
    State(shelf): State<Arc<FavoriteShelf>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let listings = shelf.list(&principal)?;
    let payload = json!({
        "total": listings.len(),
        "favorites": listings,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}
