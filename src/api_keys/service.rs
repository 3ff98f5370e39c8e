// Ballpark - API Keys Service
//
// The credential lifecycle. Each operation validates its input, runs one
// repository call on the blocking pool, and maps "no row" outcomes to the
// matching `ApiError`. Raw keys are generated here, hashed here, and
// returned to the caller exactly once.

use std::sync::Arc;

use uuid::Uuid;

use super::types::{parse_status, ApiClient, ApiKeyPublic, DeletedKey, IssuedKey, ServiceName};
use crate::error::ApiError;
use crate::secret::{generate_raw_key, SecretHasher};
use crate::store::{
    Database, NewServiceKey, ServiceKeyRepository, SqliteServiceKeyRepository, StoreError,
};

const MISSING_API_KEY: &str = "Missing API key";
const INVALID_API_KEY: &str = "Invalid API key";
const INACTIVE_API_KEY: &str = "API key is inactive";

/// Credential store operations over the service key table.
#[derive(Clone)]
pub struct ApiKeysService {
    db: Database,
    hasher: Arc<SecretHasher>,
}

fn service_not_found(service_name: &ServiceName) -> ApiError {
    ApiError::NotFound(format!("Service not found: {}", service_name))
}

impl ApiKeysService {
    pub fn new(db: Database, hasher: SecretHasher) -> Self {
        Self {
            db,
            hasher: Arc::new(hasher),
        }
    }

    /// Provision a key for a new service. Fails with `Conflict` if the
    /// service already has one.
    pub async fn create_service_key(&self, service_name: &str) -> Result<IssuedKey, ApiError> {
        let service_name = ServiceName::parse(service_name)?;
        let generated = generate_raw_key(&service_name);

        let new_key = NewServiceKey {
            service_name: service_name.as_str().to_string(),
            secret_hash: self.hasher.hash(generated.raw_key()),
            secret_prefix: generated.prefix().to_string(),
        };

        let record = self
            .db
            .call(move |conn| SqliteServiceKeyRepository::new(conn).insert(new_key))
            .await
            .map_err(|e| match e {
                StoreError::Duplicate => ApiError::Conflict(format!(
                    "API key already exists for service: {}",
                    service_name
                )),
                other => other.into(),
            })?;

        tracing::info!(
            key_id = %record.id,
            service_name = %record.service_name,
            key_prefix = %record.secret_prefix,
            "Service API key created"
        );

        Ok(IssuedKey::new(generated.into_raw_key(), ApiKeyPublic::from(&record)))
    }

    /// Issue a fresh key for an existing service. The previous key stops
    /// authenticating immediately; status is left as it was.
    pub async fn rotate_service_key(&self, service_name: &str) -> Result<IssuedKey, ApiError> {
        let service_name = ServiceName::parse(service_name)?;
        let generated = generate_raw_key(&service_name);

        let name = service_name.as_str().to_string();
        let secret_hash = self.hasher.hash(generated.raw_key());
        let secret_prefix = generated.prefix().to_string();

        let record = self
            .db
            .call(move |conn| {
                SqliteServiceKeyRepository::new(conn).replace_secret(
                    &name,
                    &secret_hash,
                    &secret_prefix,
                )
            })
            .await?
            .ok_or_else(|| service_not_found(&service_name))?;

        tracing::info!(
            key_id = %record.id,
            service_name = %record.service_name,
            key_prefix = %record.secret_prefix,
            status = %record.status,
            "Service API key rotated"
        );

        Ok(IssuedKey::new(generated.into_raw_key(), ApiKeyPublic::from(&record)))
    }

    pub async fn set_service_status(
        &self,
        service_name: &str,
        status: &str,
    ) -> Result<ApiKeyPublic, ApiError> {
        let service_name = ServiceName::parse(service_name)?;
        let status = parse_status(status)?;

        let name = service_name.as_str().to_string();
        let record = self
            .db
            .call(move |conn| SqliteServiceKeyRepository::new(conn).set_status(&name, status))
            .await?
            .ok_or_else(|| service_not_found(&service_name))?;

        tracing::info!(
            key_id = %record.id,
            service_name = %record.service_name,
            status = %record.status,
            "Service API key status updated"
        );

        Ok(ApiKeyPublic::from(&record))
    }

    pub async fn delete_service_key(&self, service_name: &str) -> Result<DeletedKey, ApiError> {
        let service_name = ServiceName::parse(service_name)?;

        let name = service_name.as_str().to_string();
        let deleted = self
            .db
            .call(move |conn| SqliteServiceKeyRepository::new(conn).delete(&name))
            .await?;

        if !deleted {
            return Err(service_not_found(&service_name));
        }

        tracing::info!(service_name = %service_name, "Service API key deleted");

        Ok(DeletedKey {
            service_name: service_name.as_str().to_string(),
            deleted: true,
        })
    }

    /// Resolve a raw key to the caller identity. Unknown keys are
    /// `Unauthorized` regardless of whether the service exists; inactive
    /// keys are `Forbidden`.
    pub async fn authenticate(&self, raw_key: &str) -> Result<ApiClient, ApiError> {
        let raw_key = raw_key.trim();
        if raw_key.is_empty() {
            return Err(ApiError::Unauthorized(MISSING_API_KEY.to_string()));
        }

        let secret_hash = self.hasher.hash(raw_key);
        let record = self
            .db
            .call(move |conn| SqliteServiceKeyRepository::new(conn).find_by_hash(&secret_hash))
            .await?;

        let Some(record) = record else {
            tracing::debug!("API key rejected: no matching record");
            return Err(ApiError::Unauthorized(INVALID_API_KEY.to_string()));
        };

        if !record.is_active() {
            tracing::debug!(service_name = %record.service_name, "API key rejected: inactive");
            return Err(ApiError::Forbidden(INACTIVE_API_KEY.to_string()));
        }

        Ok(ApiClient {
            key_id: record.id,
            service_name: record.service_name,
            status: record.status,
        })
    }

    /// Look up a record by its store id. Malformed ids are treated as absent.
    pub async fn get_by_id(&self, id: &str) -> Result<ApiKeyPublic, ApiError> {
        let not_found = || ApiError::NotFound("API key service not found".to_string());
        let id = Uuid::parse_str(id.trim()).map_err(|_| not_found())?;

        let record = self
            .db
            .call(move |conn| SqliteServiceKeyRepository::new(conn).find_by_id(&id))
            .await?
            .ok_or_else(not_found)?;

        Ok(ApiKeyPublic::from(&record))
    }

    pub async fn get_by_name(&self, service_name: &str) -> Result<ApiKeyPublic, ApiError> {
        let service_name = ServiceName::parse(service_name)?;

        let name = service_name.as_str().to_string();
        let record = self
            .db
            .call(move |conn| SqliteServiceKeyRepository::new(conn).find_by_name(&name))
            .await?
            .ok_or_else(|| service_not_found(&service_name))?;

        Ok(ApiKeyPublic::from(&record))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ApiKeyStatus;

    fn setup_service() -> ApiKeysService {
        let db = Database::open_in_memory().unwrap();
        ApiKeysService::new(db, SecretHasher::new("test-api-key-pepper"))
    }

    fn stored_hash(service: &ApiKeysService, name: &str) -> String {
        service
            .db
            .conn()
            .query_row(
                "SELECT secret_hash FROM service_api_keys WHERE service_name = ?1",
                rusqlite::params![name],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_authenticate() {
        let service = setup_service();

        let issued = service.create_service_key("draft-kit").await.unwrap();
        assert!(issued.raw_key().starts_with("draft-kit_"));
        assert_eq!(issued.api_key.service_name, "draft-kit");
        assert_eq!(issued.api_key.status, ApiKeyStatus::Active);
        assert_eq!(issued.api_key.key_prefix.len(), 10);

        let client = service.authenticate(issued.raw_key()).await.unwrap();
        assert_eq!(client.service_name, "draft-kit");
        assert_eq!(client.status, ApiKeyStatus::Active);
        assert_eq!(client.key_id, issued.api_key.id);
    }

    #[tokio::test]
    async fn test_create_normalizes_name() {
        let service = setup_service();

        let issued = service.create_service_key("  Draft-Kit  ").await.unwrap();
        assert_eq!(issued.api_key.service_name, "draft-kit");
        assert!(issued.raw_key().starts_with("draft-kit_"));
    }

    #[tokio::test]
    async fn test_stored_hash_is_not_raw_key() {
        let service = setup_service();

        let issued = service.create_service_key("draft-kit").await.unwrap();
        let hash = stored_hash(&service, "draft-kit");
        assert_ne!(hash, issued.raw_key());
        assert!(!hash.contains(issued.raw_key()));
        assert_eq!(hash, SecretHasher::new("test-api-key-pepper").hash(issued.raw_key()));
    }

    #[tokio::test]
    async fn test_create_invalid_name_is_validation_error() {
        let service = setup_service();

        let err = service.create_service_key("bad name!").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let service = setup_service();

        for other in ["stats-feed", "league-sync", "mock-draft"] {
            service.create_service_key(other).await.unwrap();
        }
        service.create_service_key("draft-kit").await.unwrap();

        let err = service.create_service_key("DRAFT-KIT").await.unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.to_string(), "API key already exists for service: draft-kit");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_create_yields_one_success() {
        let service = setup_service();

        let a = tokio::spawn({
            let service = service.clone();
            async move { service.create_service_key("same-name").await }
        });
        let b = tokio::spawn({
            let service = service.clone();
            async move { service.create_service_key("same-name").await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(ApiError::Conflict(_))))
            .count();

        assert_eq!(successes.len(), 1);
        assert_eq!(conflicts, 1);

        // The surviving record authenticates with the winning key.
        let client = service.authenticate(successes[0].raw_key()).await.unwrap();
        assert_eq!(client.service_name, "same-name");
    }

    #[tokio::test]
    async fn test_rotate_invalidates_old_key() {
        let service = setup_service();

        let original = service.create_service_key("draft-kit").await.unwrap();
        let rotated = service.rotate_service_key("draft-kit").await.unwrap();

        assert_ne!(original.raw_key(), rotated.raw_key());
        assert_eq!(rotated.api_key.id, original.api_key.id);
        assert_eq!(rotated.api_key.created_at, original.api_key.created_at);

        let err = service.authenticate(original.raw_key()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        let client = service.authenticate(rotated.raw_key()).await.unwrap();
        assert_eq!(client.service_name, "draft-kit");
    }

    #[tokio::test]
    async fn test_rotate_preserves_inactive_status() {
        let service = setup_service();

        service.create_service_key("draft-kit").await.unwrap();
        service.set_service_status("draft-kit", "inactive").await.unwrap();

        let rotated = service.rotate_service_key("draft-kit").await.unwrap();
        assert_eq!(rotated.api_key.status, ApiKeyStatus::Inactive);

        let err = service.authenticate(rotated.raw_key()).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_rotate_missing_service_is_not_found() {
        let service = setup_service();

        let err = service.rotate_service_key("missing-service").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Service not found: missing-service");
    }

    #[tokio::test]
    async fn test_inactive_key_is_forbidden_not_unauthorized() {
        let service = setup_service();

        let issued = service.create_service_key("draft-kit").await.unwrap();
        let view = service.set_service_status("draft-kit", "inactive").await.unwrap();
        assert_eq!(view.status, ApiKeyStatus::Inactive);

        let err = service.authenticate(issued.raw_key()).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.to_string(), "API key is inactive");

        // Reactivation restores access with the same key.
        service.set_service_status("draft-kit", "active").await.unwrap();
        assert!(service.authenticate(issued.raw_key()).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_status_rejects_unknown_status() {
        let service = setup_service();

        service.create_service_key("draft-kit").await.unwrap();
        let err = service.set_service_status("draft-kit", "paused").await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_set_status_missing_service_is_not_found() {
        let service = setup_service();

        let err = service.set_service_status("missing", "inactive").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_delete_revokes_key() {
        let service = setup_service();

        let issued = service.create_service_key("draft-kit").await.unwrap();
        let deleted = service.delete_service_key("draft-kit").await.unwrap();
        assert_eq!(
            deleted,
            DeletedKey {
                service_name: "draft-kit".to_string(),
                deleted: true
            }
        );

        let err = service.authenticate(issued.raw_key()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));

        assert_eq!(service.rotate_service_key("draft-kit").await.unwrap_err().status_code(), 404);
        assert_eq!(
            service
                .set_service_status("draft-kit", "active")
                .await
                .unwrap_err()
                .status_code(),
            404
        );
        assert_eq!(service.delete_service_key("draft-kit").await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_unknown_key_is_unauthorized() {
        let service = setup_service();

        service.create_service_key("draft-kit").await.unwrap();
        let err = service.authenticate("draft-kit_not-a-real-key").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid API key"));
    }

    #[tokio::test]
    async fn test_key_from_other_pepper_is_unauthorized() {
        let db = Database::open_in_memory().unwrap();
        let issuer = ApiKeysService::new(db.clone(), SecretHasher::new("pepper-a"));
        let verifier = ApiKeysService::new(db, SecretHasher::new("pepper-b"));

        let issued = issuer.create_service_key("draft-kit").await.unwrap();
        let err = verifier.authenticate(issued.raw_key()).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_blank_key_is_rejected_before_lookup() {
        let service = setup_service();
        // With the table gone any store lookup would fail as Internal.
        service.db.conn().execute_batch("DROP TABLE service_api_keys").unwrap();

        for blank in ["", "   ", "\t\n"] {
            let err = service.authenticate(blank).await.unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Missing API key"));
        }

        let err = service.authenticate("draft-kit_abc").await.unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn test_authenticate_trims_whitespace() {
        let service = setup_service();

        let issued = service.create_service_key("draft-kit").await.unwrap();
        let padded = format!("  {}\n", issued.raw_key());
        assert!(service.authenticate(&padded).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_by_id_and_name() {
        let service = setup_service();

        let issued = service.create_service_key("draft-kit").await.unwrap();

        let by_id = service.get_by_id(&issued.api_key.id.to_string()).await.unwrap();
        assert_eq!(by_id, issued.api_key);

        let by_name = service.get_by_name("Draft-Kit").await.unwrap();
        assert_eq!(by_name, issued.api_key);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let service = setup_service();

        let err = service.get_by_id(&Uuid::new_v4().to_string()).await.unwrap_err();
        assert_eq!(err.to_string(), "API key service not found");

        let err = service.get_by_id("not-a-uuid").await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = service.get_by_name("missing").await.unwrap_err();
        assert_eq!(err.to_string(), "Service not found: missing");
    }
}
