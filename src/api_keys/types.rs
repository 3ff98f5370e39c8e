// Ballpark - API key input and output types
//
// `ServiceName` is the only way service-name input reaches the store: it is
// trimmed, lowercased, and validated on construction. Output views never
// carry the secret hash; `IssuedKey` carries the one-time raw key.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::ApiError;
use crate::store::{ApiKeyStatus, ServiceKeyRecord};

// ─── Service Name ────────────────────────────────────────────────────────────

/// A normalized service name: 2-64 chars of `[a-z0-9-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    pub const MIN_LEN: usize = 2;
    pub const MAX_LEN: usize = 64;

    pub fn parse(input: &str) -> Result<Self, ApiError> {
        let name = input.trim().to_lowercase();
        let len = name.chars().count();

        if len < Self::MIN_LEN || len > Self::MAX_LEN {
            return Err(ApiError::Validation(format!(
                "Service name must be between {} and {} characters",
                Self::MIN_LEN,
                Self::MAX_LEN
            )));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ApiError::Validation(
                "Service name must be lowercase letters, numbers, or hyphens".to_string(),
            ));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse administrative status input.
pub(crate) fn parse_status(input: &str) -> Result<ApiKeyStatus, ApiError> {
    input.parse().map_err(|_| {
        ApiError::Validation(format!(
            "Invalid status '{}': expected active or inactive",
            input
        ))
    })
}

// ─── Views ───────────────────────────────────────────────────────────────────

/// Public view of a credential record. Never includes the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyPublic {
    pub id: Uuid,
    pub service_name: String,
    pub status: ApiKeyStatus,
    pub key_prefix: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ServiceKeyRecord> for ApiKeyPublic {
    fn from(record: &ServiceKeyRecord) -> Self {
        Self {
            id: record.id,
            service_name: record.service_name.clone(),
            status: record.status,
            key_prefix: record.secret_prefix.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Verified caller identity attached to a request by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClient {
    pub key_id: Uuid,
    pub service_name: String,
    pub status: ApiKeyStatus,
}

/// Result of create/rotate: the raw key (shown once) and the public view.
pub struct IssuedKey {
    raw_key: Zeroizing<String>,
    pub api_key: ApiKeyPublic,
}

impl IssuedKey {
    pub(crate) fn new(raw_key: Zeroizing<String>, api_key: ApiKeyPublic) -> Self {
        Self { raw_key, api_key }
    }

    pub fn raw_key(&self) -> &str {
        &self.raw_key
    }
}

impl fmt::Debug for IssuedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedKey")
            .field("raw_key", &"[REDACTED]")
            .field("api_key", &self.api_key)
            .finish()
    }
}

/// Confirmation returned by delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedKey {
    pub service_name: String,
    pub deleted: bool,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
