// Ballpark - API Key Gate
//
// Middleware for protected route groups. Reads the `x-api-key` header,
// resolves it through an `Authenticator`, and attaches the resulting
// `ApiClient` to the request extensions. The gate keeps no state between
// requests; every request is hashed and looked up again.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use zeroize::Zeroizing;

use crate::api_keys::{ApiClient, ApiKeysService};
use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Resolves a presented raw key to a caller identity.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, raw_key: &str) -> Result<ApiClient, ApiError>;
}

#[async_trait]
impl Authenticator for ApiKeysService {
    async fn authenticate(&self, raw_key: &str) -> Result<ApiClient, ApiError> {
        ApiKeysService::authenticate(self, raw_key).await
    }
}

// ─── Middleware ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GateState {
    authenticator: Arc<dyn Authenticator>,
    disabled: bool,
}

impl GateState {
    /// `disabled` bypasses the gate entirely (diagnostics only).
    pub fn new(authenticator: Arc<dyn Authenticator>, disabled: bool) -> Self {
        Self {
            authenticator,
            disabled,
        }
    }
}

pub async fn require_api_key(
    State(gate): State<GateState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if gate.disabled {
        return Ok(next.run(request).await);
    }

    // Absent or non-visible-ASCII values never reach the authenticator.
    let raw_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| Zeroizing::new(value.to_string()));

    let Some(raw_key) = raw_key else {
        return Err(ApiError::Unauthorized("Missing API key".to_string()));
    };

    let client = gate.authenticator.authenticate(&raw_key).await?;
    tracing::debug!(service_name = %client.service_name, "API key accepted");

    request.extensions_mut().insert(client);
    Ok(next.run(request).await)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
