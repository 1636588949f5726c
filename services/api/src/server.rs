use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_marketplace_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use house_haunt::config::AppConfig;
use house_haunt::error::AppError;
use house_haunt::marketplace::Marketplace;
use house_haunt::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let marketplace = Marketplace::in_memory(&config.marketplace);
    let app = build_app(&marketplace, app_state, config.server.request_timeout)
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        contact_cost = config.marketplace.contact_cost,
        "house haunt marketplace ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn build_app(
    marketplace: &Marketplace,
    state: AppState,
    request_timeout: Duration,
) -> Router {
    with_marketplace_routes(marketplace)
        .layer(Extension(state))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
