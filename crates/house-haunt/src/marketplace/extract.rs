use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;

use super::error::MarketplaceError;

/// JSON body extractor whose rejections use the marketplace error shape, so a
/// malformed or over-specified payload is a 400 `validation` like any other
/// bad input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = MarketplaceError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Payload(value)),
            Err(rejection) => Err(MarketplaceError::Validation(rejection.body_text())),
        }
    }
}
