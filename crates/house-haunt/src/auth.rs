//! Typed caller identity.
//!
//! Sessions are issued by the identity gateway in front of this service; it
//! forwards the authenticated account as `x-account-id` / `x-account-role`
//! headers. Every handler consumes the resulting [`Principal`] the same way.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::marketplace::error::MarketplaceError;
use crate::marketplace::ids::AccountId;

pub const ACCOUNT_ID_HEADER: &str = "x-account-id";
pub const ACCOUNT_ROLE_HEADER: &str = "x-account-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Haunter,
    Agent,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Haunter => "haunter",
            Role::Agent => "agent",
            Role::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "haunter" => Some(Role::Haunter),
            "agent" => Some(Role::Agent),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The authenticated caller of a marketplace operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub account_id: AccountId,
    pub role: Role,
}

impl Principal {
    pub const fn new(account_id: AccountId, role: Role) -> Self {
        Self { account_id, role }
    }

    pub const fn haunter(id: u64) -> Self {
        Self::new(AccountId(id), Role::Haunter)
    }

    pub const fn agent(id: u64) -> Self {
        Self::new(AccountId(id), Role::Agent)
    }

    pub const fn admin(id: u64) -> Self {
        Self::new(AccountId(id), Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require(&self, role: Role) -> Result<(), MarketplaceError> {
        self.require_any(&[role])
    }

    pub fn require_any(&self, roles: &[Role]) -> Result<(), MarketplaceError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            let allowed: Vec<&str> = roles.iter().map(|role| role.label()).collect();
            Err(MarketplaceError::Forbidden(format!(
                "this action requires the {} role",
                allowed.join(" or ")
            )))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = parts
            .headers
            .get(ACCOUNT_ID_HEADER)
            .ok_or(AuthRejection::MissingAccount)?
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .ok_or(AuthRejection::InvalidAccount)?;

        let role = parts
            .headers
            .get(ACCOUNT_ROLE_HEADER)
            .ok_or(AuthRejection::MissingRole)?
            .to_str()
            .ok()
            .and_then(Role::parse)
            .ok_or(AuthRejection::InvalidRole)?;

        Ok(Principal::new(AccountId(account), role))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    #[error("missing x-account-id header")]
    MissingAccount,
    #[error("x-account-id must be a numeric account id")]
    InvalidAccount,
    #[error("missing x-account-role header")]
    MissingRole,
    #[error("x-account-role must be haunter, agent, or admin")]
    InvalidRole,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": "unauthorized",
            "message": self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    }
}
