// Ballpark - Service Key Repository
//
// Record-level operations on `service_api_keys`. Each method is a single
// statement: inserts surface unique-constraint violations as
// `StoreError::Duplicate`, and secret/status changes are one
// `UPDATE ... RETURNING` so a reader never sees a hash without its prefix.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::models::{ApiKeyStatus, NewServiceKey, ServiceKeyRecord};
use super::StoreError;

const COLUMNS: &str =
    "id, service_name, secret_hash, secret_prefix, status, created_at, updated_at";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over service key persistence.
pub trait ServiceKeyRepository {
    /// Insert a new active record. Fails with `Duplicate` if the service name
    /// or secret hash is already taken.
    fn insert(&self, new_key: NewServiceKey) -> Result<ServiceKeyRecord, StoreError>;

    fn find_by_id(&self, id: &Uuid) -> Result<Option<ServiceKeyRecord>, StoreError>;

    fn find_by_name(&self, service_name: &str) -> Result<Option<ServiceKeyRecord>, StoreError>;

    /// Lookup used on the authentication path.
    fn find_by_hash(&self, secret_hash: &str) -> Result<Option<ServiceKeyRecord>, StoreError>;

    /// Replace hash and prefix in place. Returns `None` if no record exists.
    fn replace_secret(
        &self,
        service_name: &str,
        secret_hash: &str,
        secret_prefix: &str,
    ) -> Result<Option<ServiceKeyRecord>, StoreError>;

    /// Replace the status. Returns `None` if no record exists.
    fn set_status(
        &self,
        service_name: &str,
        status: ApiKeyStatus,
    ) -> Result<Option<ServiceKeyRecord>, StoreError>;

    /// Delete a record by service name. Returns true if it existed.
    fn delete(&self, service_name: &str) -> Result<bool, StoreError>;
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

pub struct SqliteServiceKeyRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteServiceKeyRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ServiceKeyRecord> {
        let id_str: String = row.get(0)?;
        let service_name: String = row.get(1)?;
        let secret_hash: String = row.get(2)?;
        let secret_prefix: String = row.get(3)?;
        let status_str: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        let id = Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let status: ApiKeyStatus = status_str.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let created_at = parse_timestamp(5, &created_at_str)?;
        let updated_at = parse_timestamp(6, &updated_at_str)?;

        Ok(ServiceKeyRecord::new(
            id,
            service_name,
            secret_hash,
            secret_prefix,
            status,
            created_at,
            updated_at,
        ))
    }

    fn find_one(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<ServiceKeyRecord>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM service_api_keys WHERE {column} = ?1");
        let record = self
            .conn
            .query_row(&sql, params![value], Self::row_to_record)
            .optional()?;
        Ok(record)
    }
}

pub(super) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Map a unique-constraint violation to `Duplicate`; pass everything else through.
pub(super) fn map_write_error(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref err, _) = e {
        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        {
            return StoreError::Duplicate;
        }
    }
    StoreError::Database(e)
}

impl<'a> ServiceKeyRepository for SqliteServiceKeyRepository<'a> {
    fn insert(&self, new_key: NewServiceKey) -> Result<ServiceKeyRecord, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        let sql = format!(
            "INSERT INTO service_api_keys
                (id, service_name, secret_hash, secret_prefix, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {COLUMNS}"
        );
        let record = self
            .conn
            .query_row(
                &sql,
                params![
                    id.to_string(),
                    new_key.service_name,
                    new_key.secret_hash,
                    new_key.secret_prefix,
                    ApiKeyStatus::Active.as_str(),
                    now,
                    now,
                ],
                Self::row_to_record,
            )
            .map_err(map_write_error)?;

        tracing::debug!(key_id = %record.id, service_name = %record.service_name, "Service key row inserted");
        Ok(record)
    }

    fn find_by_id(&self, id: &Uuid) -> Result<Option<ServiceKeyRecord>, StoreError> {
        self.find_one("id", &id.to_string())
    }

    fn find_by_name(&self, service_name: &str) -> Result<Option<ServiceKeyRecord>, StoreError> {
        self.find_one("service_name", service_name)
    }

    fn find_by_hash(&self, secret_hash: &str) -> Result<Option<ServiceKeyRecord>, StoreError> {
        self.find_one("secret_hash", secret_hash)
    }

    fn replace_secret(
        &self,
        service_name: &str,
        secret_hash: &str,
        secret_prefix: &str,
    ) -> Result<Option<ServiceKeyRecord>, StoreError> {
        let sql = format!(
            "UPDATE service_api_keys
             SET secret_hash = ?1, secret_prefix = ?2, updated_at = ?3
             WHERE service_name = ?4
             RETURNING {COLUMNS}"
        );
        let record = self
            .conn
            .query_row(
                &sql,
                params![secret_hash, secret_prefix, Utc::now().to_rfc3339(), service_name],
                Self::row_to_record,
            )
            .optional()
            .map_err(map_write_error)?;
        Ok(record)
    }

    fn set_status(
        &self,
        service_name: &str,
        status: ApiKeyStatus,
    ) -> Result<Option<ServiceKeyRecord>, StoreError> {
        let sql = format!(
            "UPDATE service_api_keys
             SET status = ?1, updated_at = ?2
             WHERE service_name = ?3
             RETURNING {COLUMNS}"
        );
        let record = self
            .conn
            .query_row(
                &sql,
                params![status.as_str(), Utc::now().to_rfc3339(), service_name],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn delete(&self, service_name: &str) -> Result<bool, StoreError> {
        let affected = self.conn.execute(
            "DELETE FROM service_api_keys WHERE service_name = ?1",
            params![service_name],
        )?;
        Ok(affected > 0)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
