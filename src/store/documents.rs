// Ballpark - Document Repository
//
// Player and league documents share one table shape: a JSON body keyed by
// an external id. Upserts are `INSERT ... ON CONFLICT(external_id) DO UPDATE`
// with a change guard, so rewriting an identical document touches nothing
// and is not counted.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::models::{Collection, DocumentRecord, NewDocument};
use super::repository::{map_write_error, parse_timestamp};
use super::StoreError;

const COLUMNS: &str = "id, external_id, name, document, created_at, updated_at";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over document persistence for one collection.
pub trait DocumentRepository {
    fn find_by_id(&self, id: &Uuid) -> Result<Option<DocumentRecord>, StoreError>;

    fn find_by_external_id(&self, external_id: &str)
        -> Result<Option<DocumentRecord>, StoreError>;

    /// Insert a new document. Fails with `Duplicate` if the external id is taken.
    fn insert(&self, doc: &NewDocument) -> Result<DocumentRecord, StoreError>;

    /// Insert, or replace the document stored under the same external id.
    fn upsert(&self, doc: &NewDocument) -> Result<DocumentRecord, StoreError>;

    /// Upsert a batch in one transaction. Returns how many rows were inserted
    /// or actually changed.
    fn upsert_many(&self, docs: &[NewDocument]) -> Result<usize, StoreError>;

    /// Insert a batch in one transaction. A duplicate rolls back the batch.
    fn insert_many(&self, docs: &[NewDocument]) -> Result<usize, StoreError>;

    /// Delete every document. Returns how many were removed.
    fn clear(&self) -> Result<usize, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

pub struct SqliteDocumentRepository<'a> {
    conn: &'a Connection,
    collection: Collection,
}

impl<'a> SqliteDocumentRepository<'a> {
    pub fn new(conn: &'a Connection, collection: Collection) -> Self {
        Self { conn, collection }
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRecord> {
        let id_str: String = row.get(0)?;
        let created_at_str: String = row.get(4)?;
        let updated_at_str: String = row.get(5)?;

        let id = Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(DocumentRecord {
            id,
            external_id: row.get(1)?,
            name: row.get(2)?,
            document: row.get(3)?,
            created_at: parse_timestamp(4, &created_at_str)?,
            updated_at: parse_timestamp(5, &updated_at_str)?,
        })
    }

    fn find_one(&self, column: &str, value: &str) -> Result<Option<DocumentRecord>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE {column} = ?1",
            self.collection.table()
        );
        let record = self
            .conn
            .query_row(&sql, params![value], Self::row_to_record)
            .optional()?;
        Ok(record)
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (id, external_id, name, document, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            self.collection.table()
        )
    }

    /// The update branch only fires when the stored row differs.
    fn upsert_sql(&self) -> String {
        let table = self.collection.table();
        format!(
            "INSERT INTO {table} (id, external_id, name, document, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(external_id) DO UPDATE SET
                 name = excluded.name,
                 document = excluded.document,
                 updated_at = excluded.updated_at
             WHERE {table}.name IS NOT excluded.name
                OR {table}.document IS NOT excluded.document"
        )
    }
}

impl<'a> DocumentRepository for SqliteDocumentRepository<'a> {
    fn find_by_id(&self, id: &Uuid) -> Result<Option<DocumentRecord>, StoreError> {
        self.find_one("id", &id.to_string())
    }

    fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<DocumentRecord>, StoreError> {
        self.find_one("external_id", external_id)
    }

    fn insert(&self, doc: &NewDocument) -> Result<DocumentRecord, StoreError> {
        let sql = format!("{} RETURNING {COLUMNS}", self.insert_sql());
        let record = self
            .conn
            .query_row(
                &sql,
                params![
                    Uuid::new_v4().to_string(),
                    doc.external_id,
                    doc.name,
                    doc.document,
                    Utc::now().to_rfc3339(),
                ],
                Self::row_to_record,
            )
            .map_err(map_write_error)?;
        Ok(record)
    }

    fn upsert(&self, doc: &NewDocument) -> Result<DocumentRecord, StoreError> {
        let sql = format!("{} RETURNING {COLUMNS}", self.upsert_sql());
        let written = self
            .conn
            .query_row(
                &sql,
                params![
                    Uuid::new_v4().to_string(),
                    doc.external_id,
                    doc.name,
                    doc.document,
                    Utc::now().to_rfc3339(),
                ],
                Self::row_to_record,
            )
            .optional()
            .map_err(map_write_error)?;

        // No row back means the stored document was already identical.
        match written {
            Some(record) => Ok(record),
            None => self.find_by_external_id(&doc.external_id)?.ok_or_else(|| {
                StoreError::Other(format!("document vanished during upsert: {}", doc.external_id))
            }),
        }
    }

    fn upsert_many(&self, docs: &[NewDocument]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();

        let changed = {
            let mut stmt = tx.prepare(&self.upsert_sql())?;
            let mut changed = 0;
            for doc in docs {
                changed += stmt
                    .execute(params![
                        Uuid::new_v4().to_string(),
                        doc.external_id,
                        doc.name,
                        doc.document,
                        now,
                    ])
                    .map_err(map_write_error)?;
            }
            changed
        };

        tx.commit()?;
        tracing::debug!(
            table = self.collection.table(),
            submitted = docs.len(),
            changed,
            "Bulk upsert committed"
        );
        Ok(changed)
    }

    fn insert_many(&self, docs: &[NewDocument]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let now = Utc::now().to_rfc3339();

        {
            let mut stmt = tx.prepare(&self.insert_sql())?;
            for doc in docs {
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    doc.external_id,
                    doc.name,
                    doc.document,
                    now,
                ])
                .map_err(map_write_error)?;
            }
        }

        tx.commit()?;
        Ok(docs.len())
    }

    fn clear(&self) -> Result<usize, StoreError> {
        let removed = self
            .conn
            .execute(&format!("DELETE FROM {}", self.collection.table()), [])?;
        Ok(removed)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT count(*) FROM {}", self.collection.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    fn doc(external_id: &str, name: &str, body: &str) -> NewDocument {
        NewDocument {
            external_id: external_id.to_string(),
            name: name.to_string(),
            document: body.to_string(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = SqliteDocumentRepository::new(&conn, Collection::Players);

        let rec = repo.insert(&doc("660271", "Shohei Ohtani", "{\"a\":1}")).unwrap();
        assert_eq!(rec.external_id, "660271");
        assert_eq!(rec.created_at, rec.updated_at);

        assert_eq!(repo.find_by_id(&rec.id).unwrap().unwrap().name, "Shohei Ohtani");
        assert_eq!(repo.find_by_external_id("660271").unwrap().unwrap().id, rec.id);
        assert!(repo.find_by_id(&Uuid::new_v4()).unwrap().is_none());
        assert!(repo.find_by_external_id("missing").unwrap().is_none());
    }

    #[test]
    fn test_insert_duplicate_external_id_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = SqliteDocumentRepository::new(&conn, Collection::Players);

        repo.insert(&doc("660271", "A", "{}")).unwrap();
        let err = repo.insert(&doc("660271", "B", "{}")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate), "got {:?}", err);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = SqliteDocumentRepository::new(&conn, Collection::Leagues);

        let first = repo.upsert(&doc("standard-5x5-roto", "Roto", "{\"v\":1}")).unwrap();
        let second = repo.upsert(&doc("standard-5x5-roto", "Roto", "{\"v\":2}")).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.document, "{\"v\":2}");
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_identical_document_returns_stored_row() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = SqliteDocumentRepository::new(&conn, Collection::Leagues);

        let first = repo.upsert(&doc("obp-league", "OBP", "{}")).unwrap();
        let again = repo.upsert(&doc("obp-league", "OBP", "{}")).unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.updated_at, first.updated_at);
    }

    #[test]
    fn test_upsert_many_counts_only_real_changes() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = SqliteDocumentRepository::new(&conn, Collection::Players);

        let batch = vec![doc("1", "A", "{\"hr\":10}"), doc("2", "B", "{\"hr\":20}")];
        assert_eq!(repo.upsert_many(&batch).unwrap(), 2);

        // Same batch again changes nothing.
        assert_eq!(repo.upsert_many(&batch).unwrap(), 0);

        // One modified, one new, one untouched.
        let batch = vec![
            doc("1", "A", "{\"hr\":11}"),
            doc("2", "B", "{\"hr\":20}"),
            doc("3", "C", "{}"),
        ];
        assert_eq!(repo.upsert_many(&batch).unwrap(), 2);
        assert_eq!(repo.count().unwrap(), 3);
        assert_eq!(repo.find_by_external_id("1").unwrap().unwrap().document, "{\"hr\":11}");
    }

    #[test]
    fn test_upsert_many_empty_batch() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = SqliteDocumentRepository::new(&conn, Collection::Players);

        assert_eq!(repo.upsert_many(&[]).unwrap(), 0);
    }

    #[test]
    fn test_insert_many_rolls_back_on_duplicate() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let repo = SqliteDocumentRepository::new(&conn, Collection::Players);

        let err = repo
            .insert_many(&[doc("1", "A", "{}"), doc("2", "B", "{}"), doc("1", "A", "{}")])
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate));
        assert_eq!(repo.count().unwrap(), 0);

        assert_eq!(repo.insert_many(&[doc("1", "A", "{}"), doc("2", "B", "{}")]).unwrap(), 2);
    }

    #[test]
    fn test_clear_and_collection_isolation() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let players = SqliteDocumentRepository::new(&conn, Collection::Players);
        let leagues = SqliteDocumentRepository::new(&conn, Collection::Leagues);

        players.insert(&doc("1", "A", "{}")).unwrap();
        leagues.insert(&doc("1", "Roto", "{}")).unwrap();

        assert_eq!(players.clear().unwrap(), 1);
        assert_eq!(players.count().unwrap(), 0);
        assert_eq!(leagues.count().unwrap(), 1);
    }
}
