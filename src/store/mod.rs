// Ballpark - Store Module
//
// SQLite persistence for service API-key records and for the player and
// league documents. Uniqueness of service names, secret hashes, and external
// ids is enforced by the schema, never by check-then-write.

mod db;
mod documents;
mod error;
mod models;
mod repository;

pub use db::Database;
pub use documents::{DocumentRepository, SqliteDocumentRepository};
pub use error::StoreError;
pub use models::{
    ApiKeyStatus, Collection, DocumentRecord, NewDocument, NewServiceKey, ServiceKeyRecord,
    UnknownStatus,
};
pub use repository::{ServiceKeyRepository, SqliteServiceKeyRepository};
