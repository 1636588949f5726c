use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    Listing, ListingDraft, ListingEdit, ListingFilter, ListingStatus, ModerationRequest,
};
use super::service::ListingDirectory;
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::extract::Payload;
use crate::marketplace::ids::ListingId;

#[derive(Debug, Default, Deserialize)]
pub struct AdminListingQuery {
    pub status: Option<String>,
}

pub fn listing_router(directory: Arc<ListingDirectory>) -> Router {
    Router::new()
        .route(
            "/api/v1/listings",
            get(browse_handler).post(create_handler),
        )
        .route("/api/v1/listings/mine", get(mine_handler))
        .route(
            "/api/v1/listings/:listing_id",
            get(detail_handler)
                .patch(edit_handler)
                .delete(delete_handler),
        )
        .route("/api/v1/admin/listings", get(admin_list_handler))
        .route(
            "/api/v1/admin/listings/:listing_id/review",
            post(moderate_handler),
        )
        .with_state(directory)
}

fn listing_page(listings: Vec<Listing>) -> Response {
    let payload = json!({
        "total": listings.len(),
        "listings": listings,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn browse_handler(
    State(directory): State<Arc<ListingDirectory>>,
    _principal: Principal,
    Query(filter): Query<ListingFilter>,
) -> Result<Response, MarketplaceError> {
    Ok(listing_page(directory.list_approved(&filter)?))
}

pub(crate) async fn create_handler(
    State(directory): State<Arc<ListingDirectory>>,
    principal: Principal,
    Payload(draft): Payload<ListingDraft>,
) -> Result<Response, MarketplaceError> {
    let listing = directory.create(&principal, draft)?;
    Ok((StatusCode::CREATED, Json(listing)).into_response())
}

pub(crate) async fn mine_handler(
    State(directory): State<Arc<ListingDirectory>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    Ok(listing_page(directory.list_for_agent(&principal)?))
}

pub(crate) async fn detail_handler(
    State(directory): State<Arc<ListingDirectory>>,
    principal: Principal,
    Path(listing_id): Path<u64>,
) -> Result<Response, MarketplaceError> {
    let listing = directory.get(&principal, ListingId(listing_id))?;
    Ok((StatusCode::OK, Json(listing)).into_response())
}

pub(crate) async fn edit_handler(
    State(directory): State<Arc<ListingDirectory>>,
    principal: Principal,
    Path(listing_id): Path<u64>,
    Payload(edit): Payload<ListingEdit>,
) -> Result<Response, MarketplaceError> {
    let listing = directory.edit(&principal, ListingId(listing_id), edit)?;
    Ok((StatusCode::OK, Json(listing)).into_response())
}

pub(crate) async fn delete_handler(
    State(directory): State<Arc<ListingDirectory>>,
    principal: Principal,
    Path(listing_id): Path<u64>,
) -> Result<Response, MarketplaceError> {
    let listing = directory.delete(&principal, ListingId(listing_id))?;
    let payload = json!({
        "message": format!("House '{}' deleted successfully.", listing.title),
        "listing_id": listing.id,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

pub(crate) async fn admin_list_handler(
    State(directory): State<Arc<ListingDirectory>>,
    principal: Principal,
    Query(query): Query<AdminListingQuery>,
) -> Result<Response, MarketplaceError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(ListingStatus::parse(raw).ok_or_else(|| {
            MarketplaceError::validation("status must be pending, approved, or rejected")
        })?),
        None => None,
    };
    Ok(listing_page(directory.list_all(&principal, status)?))
}

pub(crate) async fn moderate_handler(
    State(directory): State<Arc<ListingDirectory>>,
    principal: Principal,
    Path(listing_id): Path<u64>,
    Payload(request): Payload<ModerationRequest>,
) -> Result<Response, MarketplaceError> {
    let decision = match ListingStatus::parse(&request.decision) {
        Some(status @ (ListingStatus::Approved | ListingStatus::Rejected)) => status,
        _ => {
            return Err(MarketplaceError::validation(
                "decision must be 'approved' or 'rejected'",
            ))
        }
    };
    let listing =
        directory.update_status(&principal, ListingId(listing_id), decision, request.note)?;
    Ok((StatusCode::OK, Json(listing)).into_response())
}
