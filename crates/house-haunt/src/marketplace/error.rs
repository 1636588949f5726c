use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

const RETRY_AFTER_SECS: &str = "1";

/// Failure taxonomy shared by every marketplace component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarketplaceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("insufficient credits: {required} required, {available} available; please top up")]
    InsufficientFunds { required: u64, available: u64 },
    #[error("{0}")]
    Validation(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl MarketplaceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Stable machine-readable kind returned to clients.
    pub const fn kind(&self) -> &'static str {
        match self {
            MarketplaceError::NotFound(_) => "not_found",
            MarketplaceError::Forbidden(_) => "forbidden",
            MarketplaceError::Conflict(_) => "conflict",
            MarketplaceError::InsufficientFunds { .. } => "insufficient_funds",
            MarketplaceError::Validation(_) => "validation",
            MarketplaceError::Unavailable(_) => "unavailable",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            MarketplaceError::NotFound(_) => StatusCode::NOT_FOUND,
            MarketplaceError::Forbidden(_) => StatusCode::FORBIDDEN,
            MarketplaceError::Conflict(_) => StatusCode::CONFLICT,
            MarketplaceError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            MarketplaceError::Validation(_) => StatusCode::BAD_REQUEST,
            MarketplaceError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Only storage outages are worth retrying with backoff.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, MarketplaceError::Unavailable(_))
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        let payload = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        let mut response = (self.status(), Json(payload)).into_response();
        if self.is_retryable() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static(RETRY_AFTER_SECS));
        }
        response
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for MarketplaceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => MarketplaceError::conflict("record already exists"),
            RepositoryError::NotFound => MarketplaceError::NotFound("record"),
            RepositoryError::Unavailable(reason) => MarketplaceError::Unavailable(reason),
        }
    }
}
