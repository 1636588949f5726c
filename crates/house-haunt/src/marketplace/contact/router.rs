use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use super::domain::{ContactDecision, ContactRequest, DecisionRequest};
use super::service::ContactWorkflow;
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::extract::Payload;
use crate::marketplace::ids::{ContactRequestId, ListingId};

pub fn contact_router(workflow: Arc<ContactWorkflow>) -> Router {
    Router::new()
        .route(
            "/api/v1/listings/:listing_id/contact",
            post(request_contact_handler),
        )
        .route("/api/v1/contact-requests/incoming", get(incoming_handler))
        .route("/api/v1/contact-requests/outgoing", get(outgoing_handler))
        .route(
            "/api/v1/contact-requests/:request_id/decision",
            post(decide_handler),
        )
        .with_state(workflow)
}

fn request_page(requests: Vec<ContactRequest>) -> Response {
    let payload = json!({
        "total_requests": requests.len(),
        "requests": requests,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn request_contact_handler(
    State(workflow): State<Arc<ContactWorkflow>>,
    principal: Principal,
    Path(listing_id): Path<u64>,
) -> Result<Response, MarketplaceError> {
    let receipt = workflow.request_contact(&principal, ListingId(listing_id))?;
    Ok((StatusCode::CREATED, Json(receipt)).into_response())
}

pub(crate) async fn decide_handler(
    State(workflow): State<Arc<ContactWorkflow>>,
    principal: Principal,
    Path(request_id): Path<u64>,
    Payload(request): Payload<DecisionRequest>,
) -> Result<Response, MarketplaceError> {
    let decision = ContactDecision::parse(&request.decision).ok_or_else(|| {
        MarketplaceError::validation("decision must be 'accepted' or 'rejected'")
    })?;
    let outcome = workflow.decide(&principal, ContactRequestId(request_id), decision)?;
    Ok((StatusCode::OK, Json(outcome)).into_response())
}

pub(crate) async fn incoming_handler(
    State(workflow): State<Arc<ContactWorkflow>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    Ok(request_page(workflow.incoming(&principal)?))
}

pub(crate) async fn outgoing_handler(
    State(workflow): State<Arc<ContactWorkflow>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    Ok(request_page(workflow.outgoing(&principal)?))
}
