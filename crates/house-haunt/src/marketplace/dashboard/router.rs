use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use super::service::Dashboards;
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;

pub fn dashboard_router(dashboards: Arc<Dashboards>) -> Router {
    Router::new()
        .route("/api/v1/dashboard/agent", get(agent_dashboard_handler))
        .route("/api/v1/dashboard/haunter", get(haunter_dashboard_handler))
        .route("/api/v1/dashboard/admin", get(admin_dashboard_handler))
        .with_state(dashboards)
}

pub(crate) async fn agent_dashboard_handler(
    State(dashboards): State<Arc<Dashboards>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let dashboard = dashboards.agent(&principal)?;
    Ok((StatusCode::OK, Json(dashboard)).into_response())
}

pub(crate) async fn haunter_dashboard_handler(
    State(dashboards): State<Arc<Dashboards>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let dashboard = dashboards.haunter(&principal)?;
    Ok((StatusCode::OK, Json(dashboard)).into_response())
}

pub(crate) async fn admin_dashboard_handler(
    State(dashboards): State<Arc<Dashboards>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let dashboard = dashboards.admin(&principal)?;
    Ok((StatusCode::OK, Json(dashboard)).into_response())
}
