// Ballpark - Leagues Service

use uuid::Uuid;

use super::types::{League, LeagueInput};
use crate::error::ApiError;
use crate::store::{
    Collection, Database, DocumentRecord, DocumentRepository, NewDocument,
    SqliteDocumentRepository,
};

fn league_not_found() -> ApiError {
    ApiError::NotFound("League not found".to_string())
}

fn to_document(input: &LeagueInput) -> Result<NewDocument, ApiError> {
    let document = serde_json::to_string(input)
        .map_err(|e| ApiError::Internal(format!("failed to encode league: {}", e)))?;
    Ok(NewDocument {
        external_id: input.external_id.clone(),
        name: input.name.clone(),
        document,
    })
}

fn from_record(record: DocumentRecord) -> Result<League, ApiError> {
    let league = serde_json::from_str(&record.document).map_err(|e| {
        ApiError::Internal(format!("stored league {} is unreadable: {}", record.id, e))
    })?;
    Ok(League {
        id: record.id,
        league,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

#[derive(Clone)]
pub struct LeaguesService {
    db: Database,
}

impl LeaguesService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get_league_by_id(&self, id: &str) -> Result<League, ApiError> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| league_not_found())?;

        let record = self
            .db
            .call(move |conn| {
                SqliteDocumentRepository::new(conn, Collection::Leagues).find_by_id(&id)
            })
            .await?
            .ok_or_else(league_not_found)?;

        from_record(record)
    }

    /// Insert or replace the league with the same external id.
    pub async fn upsert_league(&self, input: LeagueInput) -> Result<League, ApiError> {
        let doc = to_document(&input.normalize()?)?;

        let record = self
            .db
            .call(move |conn| SqliteDocumentRepository::new(conn, Collection::Leagues).upsert(&doc))
            .await?;

        tracing::info!(league_id = %record.id, external_id = %record.external_id, "League saved");
        from_record(record)
    }

    /// Upsert a batch, skipping invalid entries. Returns the number of
    /// leagues inserted or modified.
    pub async fn upsert_leagues(&self, inputs: Vec<LeagueInput>) -> Result<usize, ApiError> {
        let submitted = inputs.len();
        let mut docs = Vec::with_capacity(submitted);
        for input in inputs {
            let external_id = input.external_id.clone();
            match input.normalize() {
                Ok(input) => docs.push(to_document(&input)?),
                Err(e) => {
                    tracing::warn!(external_id = %external_id, error = %e, "Skipping invalid league")
                }
            }
        }
        let skipped = submitted - docs.len();

        let changed = self
            .db
            .call(move |conn| {
                SqliteDocumentRepository::new(conn, Collection::Leagues).upsert_many(&docs)
            })
            .await?;

        tracing::info!(submitted, changed, skipped, "Leagues upserted");
        Ok(changed)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
