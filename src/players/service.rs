// Ballpark - Players Service
//
// Player documents keyed by the upstream `externalId`. Single writes fail
// or succeed as a unit; bulk upserts skip entries that fail validation and
// report how many stored rows were inserted or actually changed.

use uuid::Uuid;

use super::types::{Player, PlayerInput};
use crate::error::ApiError;
use crate::store::{
    Collection, Database, DocumentRecord, DocumentRepository, NewDocument,
    SqliteDocumentRepository, StoreError,
};

fn player_not_found() -> ApiError {
    ApiError::NotFound("Player not found".to_string())
}

fn to_document(input: &PlayerInput) -> Result<NewDocument, ApiError> {
    let document = serde_json::to_string(input)
        .map_err(|e| ApiError::Internal(format!("failed to encode player: {}", e)))?;
    Ok(NewDocument {
        external_id: input.external_id.clone(),
        name: input.name.clone(),
        document,
    })
}

fn from_record(record: DocumentRecord) -> Result<Player, ApiError> {
    let player = serde_json::from_str(&record.document).map_err(|e| {
        ApiError::Internal(format!("stored player {} is unreadable: {}", record.id, e))
    })?;
    Ok(Player {
        id: record.id,
        player,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

/// Normalize a batch, dropping entries that fail validation.
fn valid_documents(inputs: Vec<PlayerInput>) -> Result<(Vec<NewDocument>, usize), ApiError> {
    let mut docs = Vec::with_capacity(inputs.len());
    let mut skipped = 0;
    for input in inputs {
        let external_id = input.external_id.clone();
        match input.normalize() {
            Ok(input) => docs.push(to_document(&input)?),
            Err(e) => {
                skipped += 1;
                tracing::warn!(external_id = %external_id, error = %e, "Skipping invalid player");
            }
        }
    }
    Ok((docs, skipped))
}

#[derive(Clone)]
pub struct PlayersService {
    db: Database,
}

impl PlayersService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Look up a player by store id. Malformed ids are treated as absent.
    pub async fn get_player_by_id(&self, id: &str) -> Result<Player, ApiError> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| player_not_found())?;

        let record = self
            .db
            .call(move |conn| {
                SqliteDocumentRepository::new(conn, Collection::Players).find_by_id(&id)
            })
            .await?
            .ok_or_else(player_not_found)?;

        from_record(record)
    }

    /// Insert a new player. Fails with `Conflict` if the external id exists.
    pub async fn create_player(&self, input: PlayerInput) -> Result<Player, ApiError> {
        let doc = to_document(&input.normalize()?)?;
        let external_id = doc.external_id.clone();

        let record = self
            .db
            .call(move |conn| SqliteDocumentRepository::new(conn, Collection::Players).insert(&doc))
            .await
            .map_err(|e| match e {
                StoreError::Duplicate => {
                    ApiError::Conflict(format!("Player already exists: {}", external_id))
                }
                other => other.into(),
            })?;

        tracing::info!(player_id = %record.id, external_id = %record.external_id, "Player created");
        from_record(record)
    }

    /// Insert or replace the player with the same external id.
    pub async fn upsert_player(&self, input: PlayerInput) -> Result<Player, ApiError> {
        let doc = to_document(&input.normalize()?)?;

        let record = self
            .db
            .call(move |conn| SqliteDocumentRepository::new(conn, Collection::Players).upsert(&doc))
            .await?;

        from_record(record)
    }

    /// Upsert a batch keyed on external id. Returns the number of players
    /// inserted or modified; unchanged players are not counted.
    pub async fn upsert_players(&self, inputs: Vec<PlayerInput>) -> Result<usize, ApiError> {
        let submitted = inputs.len();
        let (docs, skipped) = valid_documents(inputs)?;

        let changed = self
            .db
            .call(move |conn| {
                SqliteDocumentRepository::new(conn, Collection::Players).upsert_many(&docs)
            })
            .await?;

        tracing::info!(submitted, changed, skipped, "Players upserted");
        Ok(changed)
    }

    /// Insert a batch of new players. Any duplicate aborts the whole batch.
    pub async fn seed_players(&self, inputs: Vec<PlayerInput>) -> Result<usize, ApiError> {
        let docs = inputs
            .into_iter()
            .map(|input| to_document(&input.normalize()?))
            .collect::<Result<Vec<_>, ApiError>>()?;

        let inserted = self
            .db
            .call(move |conn| {
                SqliteDocumentRepository::new(conn, Collection::Players).insert_many(&docs)
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate => {
                    ApiError::Conflict("Seed data contains an existing player".to_string())
                }
                other => other.into(),
            })?;

        tracing::info!(inserted, "Players seeded");
        Ok(inserted)
    }

    /// Remove every player. Returns how many were deleted.
    pub async fn clear_players(&self) -> Result<usize, ApiError> {
        let removed = self
            .db
            .call(|conn| SqliteDocumentRepository::new(conn, Collection::Players).clear())
            .await?;

        tracing::info!(removed, "Players cleared");
        Ok(removed)
    }

    pub async fn count_players(&self) -> Result<usize, ApiError> {
        let count = self
            .db
            .call(|conn| SqliteDocumentRepository::new(conn, Collection::Players).count())
            .await?;
        Ok(count)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
