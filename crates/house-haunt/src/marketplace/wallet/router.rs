use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::service::WalletService;
use crate::auth::Principal;
use crate::marketplace::error::MarketplaceError;
use crate::marketplace::extract::Payload;
use crate::marketplace::ids::AccountId;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopUpRequest {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdjustmentRequest {
    pub amount: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

pub fn wallet_router(wallet: Arc<WalletService>) -> Router {
    Router::new()
        .route("/api/v1/wallet", get(wallet_handler))
        .route("/api/v1/wallet/topup", post(top_up_handler))
        .route("/api/v1/wallet/ledger", get(ledger_handler))
        .route(
            "/api/v1/admin/wallets/:account_id/adjust",
            post(adjust_handler),
        )
        .route(
            "/api/v1/admin/wallets/:account_id/ledger",
            delete(clear_ledger_handler),
        )
        .with_state(wallet)
}

pub(crate) async fn wallet_handler(
    State(wallet): State<Arc<WalletService>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let view = wallet.wallet(&principal)?;
    Ok((StatusCode::OK, Json(view)).into_response())
}

pub(crate) async fn top_up_handler(
    State(wallet): State<Arc<WalletService>>,
    principal: Principal,
    Payload(request): Payload<TopUpRequest>,
) -> Result<Response, MarketplaceError> {
    let new_balance = wallet.top_up(&principal, request.amount)?;
    let payload = json!({
        "message": format!("Wallet topped up successfully with {} credits.", request.amount),
        "new_balance": new_balance,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

pub(crate) async fn ledger_handler(
    State(wallet): State<Arc<WalletService>>,
    principal: Principal,
) -> Result<Response, MarketplaceError> {
    let history = wallet.history(&principal)?;
    Ok((StatusCode::OK, Json(history)).into_response())
}

pub(crate) async fn adjust_handler(
    State(wallet): State<Arc<WalletService>>,
    principal: Principal,
    Path(account_id): Path<u64>,
    Payload(request): Payload<AdjustmentRequest>,
) -> Result<Response, MarketplaceError> {
    let account = AccountId(account_id);
    let new_balance =
        wallet.adjust_by_admin(&principal, account, request.amount, request.reason)?;
    let payload = json!({
        "account_id": account,
        "new_balance": new_balance,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

pub(crate) async fn clear_ledger_handler(
    State(wallet): State<Arc<WalletService>>,
    principal: Principal,
    Path(account_id): Path<u64>,
) -> Result<Response, MarketplaceError> {
    let removed = wallet.clear_history(&principal, AccountId(account_id))?;
    let payload = json!({
        "message": format!("{removed} transactions cleared."),
        "removed": removed,
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}
