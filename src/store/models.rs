// Ballpark - Service key data models
//
// SECURITY: `secret_hash` is private on the record and redacted from Debug.
// It leaves the store only through `secret_hash()`, which the service layer
// never forwards to callers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Whether a key may authenticate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyStatus {
    #[default]
    Active,
    Inactive,
}

impl ApiKeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyStatus::Active => "active",
            ApiKeyStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ApiKeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown status '{0}', expected active or inactive")]
pub struct UnknownStatus(pub String);

impl FromStr for ApiKeyStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ApiKeyStatus::Active),
            "inactive" => Ok(ApiKeyStatus::Inactive),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A persisted service key record. One per service name.
pub struct ServiceKeyRecord {
    pub id: Uuid,
    pub service_name: String,
    secret_hash: String,
    pub secret_prefix: String,
    pub status: ApiKeyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceKeyRecord {
    pub fn new(
        id: Uuid,
        service_name: String,
        secret_hash: String,
        secret_prefix: String,
        status: ApiKeyStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            service_name,
            secret_hash,
            secret_prefix,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn secret_hash(&self) -> &str {
        &self.secret_hash
    }

    pub fn is_active(&self) -> bool {
        self.status == ApiKeyStatus::Active
    }
}

impl fmt::Debug for ServiceKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceKeyRecord")
            .field("id", &self.id)
            .field("service_name", &self.service_name)
            .field("secret_hash", &"[REDACTED]")
            .field("secret_prefix", &self.secret_prefix)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Input for inserting a record. New records always start active.
pub struct NewServiceKey {
    pub service_name: String,
    pub secret_hash: String,
    pub secret_prefix: String,
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// Tables holding data documents keyed by an external id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Players,
    Leagues,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Players => "players",
            Collection::Leagues => "leagues",
        }
    }
}

/// A stored document. `document` is the JSON body; `name` is copied out of it
/// for display and ordering.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub external_id: String,
    pub name: String,
    pub document: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting or upserting a document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub external_id: String,
    pub name: String,
    pub document: String,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
