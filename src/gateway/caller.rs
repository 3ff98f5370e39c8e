// Ballpark - Caller Identity
//
// Extracts the `ApiClient` the gate attached to the request. Handlers that
// take an `ApiClient` argument reject with 401 when no identity is present,
// which only happens if the gate was bypassed.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api_keys::ApiClient;
use crate::error::ApiError;

impl<S> FromRequestParts<S> for ApiClient
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ApiClient>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Missing API client context".to_string()))
    }
}
