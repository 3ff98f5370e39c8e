// Ballpark - Player Sync Job
//
// Pulls the current roster from a `PlayerSource` and upserts it keyed on
// `externalId`. The periodic task survives failed runs: errors are logged
// and the next tick tries again. Stored players are only ever upserted, so
// a failed or empty fetch leaves the existing data in place.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::players::{PlayerInput, PlayersService};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to read player feed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed player feed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

// ─── Sources ─────────────────────────────────────────────────────────────────

/// Where the sync job gets the current player list.
#[async_trait]
pub trait PlayerSource: Send + Sync {
    async fn fetch_players(&self) -> Result<Vec<PlayerInput>, SyncError>;
}

/// Reads a JSON array of players from a file, re-read on every run.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PlayerSource for JsonFileSource {
    async fn fetch_players(&self) -> Result<Vec<PlayerInput>, SyncError> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

// ─── Job ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    /// Players inserted or modified by this run.
    pub changed: usize,
}

#[derive(Clone)]
pub struct PlayerSyncJob {
    players: PlayersService,
    source: Arc<dyn PlayerSource>,
}

impl PlayerSyncJob {
    pub fn new(players: PlayersService, source: Arc<dyn PlayerSource>) -> Self {
        Self { players, source }
    }

    /// Run one fetch-and-upsert pass.
    pub async fn run_once(&self) -> Result<SyncReport, SyncError> {
        let started = Instant::now();

        let inputs = self.source.fetch_players().await?;
        let fetched = inputs.len();
        if fetched == 0 {
            tracing::warn!("Player feed returned no players");
        }

        let changed = self.players.upsert_players(inputs).await?;

        tracing::info!(
            fetched,
            changed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Player sync complete"
        );
        Ok(SyncReport { fetched, changed })
    }

    /// Run every `every` until `token` is cancelled. The first run happens
    /// one full interval after the call.
    pub fn spawn(self, every: Duration, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            tracing::info!(interval_secs = every.as_secs(), "Player sync job started");

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::info!("Player sync job shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            tracing::error!(error = %e, "Player sync failed");
                        }
                    }
                }
            }
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
