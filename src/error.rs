// Ballpark - Error types
//
// `ApiError` is the taxonomy shared by every feature service: each variant
// carries the HTTP status it surfaces as. `BallparkError` aggregates
// configuration, store, and API errors for the application boundary.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input (400).
    #[error("{0}")]
    Validation(String),

    /// Missing credential, or no record matches it (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Credential matches an inactive record (403).
    #[error("{0}")]
    Forbidden(String),

    /// No record for the given name or id (404).
    #[error("{0}")]
    NotFound(String),

    /// A record with the same unique key already exists (409).
    #[error("{0}")]
    Conflict(String),

    /// Storage or infrastructure failure (500). The detail is logged, never
    /// returned to HTTP callers.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => ApiError::Conflict("Resource already exists".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Top-level error type for all Ballpark operations.
#[derive(Debug, Error)]
pub enum BallparkError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation("x".into()).status_code(), 400);
        assert_eq!(ApiError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), 409);
        assert_eq!(ApiError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_display_is_bare_message() {
        let err = ApiError::NotFound("Service not found: draft-kit".into());
        assert_eq!(err.to_string(), "Service not found: draft-kit");
    }

    #[test]
    fn test_store_duplicate_maps_to_conflict() {
        let err: ApiError = StoreError::Duplicate.into();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_store_failure_maps_to_internal() {
        let err: ApiError = StoreError::Other("disk full".into()).into();
        assert!(matches!(err, ApiError::Internal(ref m) if m.contains("disk full")));
    }

    #[test]
    fn test_api_error_is_transparent_at_the_boundary() {
        let err: BallparkError = ApiError::NotFound("Service not found: draft-kit".into()).into();
        assert_eq!(err.to_string(), "Service not found: draft-kit");
    }
}
