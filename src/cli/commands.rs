// Ballpark - CLI Command Handlers
//
// `serve` runs the HTTP API and, when a feed is configured, the periodic
// player sync. `sync-players` runs a single sync. `api-keys` runs one
// lifecycle operation against the credential store and closes the database
// afterwards, whatever the outcome. Raw keys are printed to stdout once and
// never logged.

use std::io::{self, Write};
use std::sync::Arc;

use chrono::SecondsFormat;
use tokio_util::sync::CancellationToken;

use crate::api_keys::ApiKeysService;
use crate::config::{Config, ConfigError};
use crate::error::BallparkError;
use crate::gateway::{self, AppState};
use crate::jobs::{JsonFileSource, PlayerSource, PlayerSyncJob};
use crate::leagues::LeaguesService;
use crate::players::PlayersService;
use crate::secret::SecretHasher;
use crate::store::Database;

use super::{ApiKeyCommand, Commands};

/// Execute the parsed CLI command, returning the process exit code.
pub async fn execute(command: Commands) -> Result<i32, BallparkError> {
    let config = Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    match command {
        Commands::Serve => {
            cmd_serve(&config).await?;
            Ok(0)
        }
        Commands::SyncPlayers { feed } => {
            let feed = feed
                .or_else(|| config.player_feed_path.clone())
                .ok_or_else(|| ConfigError::Invalid {
                    key: "PLAYER_FEED_PATH",
                    reason: "not set and no --feed given".to_string(),
                })?;
            let db = Database::open(&config.database_path)?;
            let code = sync_players(
                db,
                Arc::new(JsonFileSource::new(feed)),
                &mut io::stdout(),
                &mut io::stderr(),
            )
            .await;
            Ok(code)
        }
        Commands::ApiKeys(command) => {
            let db = Database::open(&config.database_path)?;
            let code = manage_api_keys(
                db,
                config.secret_hasher(),
                command,
                &mut io::stdout(),
                &mut io::stderr(),
            )
            .await;
            Ok(code)
        }
    }
}

// ─── Serve ───────────────────────────────────────────────────────────────────

async fn cmd_serve(config: &Config) -> Result<(), BallparkError> {
    if config.disable_api_key_auth {
        tracing::warn!(
            environment = config.environment.as_str(),
            "API key authentication is DISABLED (DISABLE_API_KEY_AUTH=true)"
        );
    }

    let db = Database::open(&config.database_path)?;
    tracing::info!(
        environment = config.environment.as_str(),
        database = %config.database_path.display(),
        "Starting Ballpark"
    );

    let keys = ApiKeysService::new(db.clone(), config.secret_hasher());
    let players = PlayersService::new(db.clone());
    let leagues = LeaguesService::new(db.clone());
    let shutdown = CancellationToken::new();

    let sync = match &config.player_feed_path {
        Some(feed) => {
            tracing::info!(feed = %feed.display(), "Scheduling player sync");
            let job = PlayerSyncJob::new(players.clone(), Arc::new(JsonFileSource::new(feed)));
            Some(job.spawn(config.player_sync_interval, shutdown.clone()))
        }
        None => {
            tracing::info!("PLAYER_FEED_PATH not set; player sync disabled");
            None
        }
    };

    let state = AppState::new(keys, players, leagues, config.disable_api_key_auth);
    let served = gateway::serve(state, config.port, shutdown.clone()).await;

    shutdown.cancel();
    if let Some(handle) = sync {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Player sync task ended abnormally");
        }
    }
    served?;

    db.close()?;
    Ok(())
}

// ─── Player Sync ─────────────────────────────────────────────────────────────

/// Run one player sync against `db`, then close it.
///
/// The summary goes to `out`; a failure is reported on `err` as
/// `Failed to sync players: <message>`. Returns 0 on success, 1 on failure.
pub async fn sync_players(
    db: Database,
    source: Arc<dyn PlayerSource>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32 {
    let job = PlayerSyncJob::new(PlayersService::new(db.clone()), source);
    let result = job.run_once().await;
    drop(job);

    if let Err(e) = db.close() {
        tracing::warn!(error = %e, "Failed to close database");
    }

    match result {
        Ok(report) => {
            let _ = writeln!(
                out,
                "Fetched {} players, {} inserted or updated",
                report.fetched, report.changed
            );
            0
        }
        Err(e) => {
            let _ = writeln!(err, "Failed to sync players: {}", e);
            1
        }
    }
}

// ─── API Keys ────────────────────────────────────────────────────────────────

/// Run one key-management command against `db`, then close it.
///
/// Results go to `out`; a failure is reported on `err` as
/// `Failed to manage API key: <message>`. Returns 0 on success, 1 on failure.
pub async fn manage_api_keys(
    db: Database,
    hasher: SecretHasher,
    command: ApiKeyCommand,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32 {
    let service = ApiKeysService::new(db.clone(), hasher);
    let result = run_api_key_command(&service, command, out).await;
    drop(service);

    if let Err(e) = db.close() {
        tracing::warn!(error = %e, "Failed to close database");
    }

    match result {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(err, "Failed to manage API key: {}", e);
            1
        }
    }
}

async fn run_api_key_command(
    service: &ApiKeysService,
    command: ApiKeyCommand,
    out: &mut dyn Write,
) -> Result<(), BallparkError> {
    match command {
        ApiKeyCommand::Create { service_name } => {
            let issued = service.create_service_key(&service_name).await?;
            writeln!(out, "Service: {}", issued.api_key.service_name)?;
            writeln!(out, "Status: {}", issued.api_key.status)?;
            writeln!(out, "Key Prefix: {}", issued.api_key.key_prefix)?;
            writeln!(out, "Raw API Key (store securely): {}", issued.raw_key())?;
        }
        ApiKeyCommand::Rotate { service_name } => {
            let issued = service.rotate_service_key(&service_name).await?;
            writeln!(out, "Service: {}", issued.api_key.service_name)?;
            writeln!(out, "Status: {}", issued.api_key.status)?;
            writeln!(out, "Key Prefix: {}", issued.api_key.key_prefix)?;
            writeln!(out, "New Raw API Key (store securely): {}", issued.raw_key())?;
        }
        ApiKeyCommand::SetStatus {
            service_name,
            status,
        } => {
            let api_key = service.set_service_status(&service_name, &status).await?;
            writeln!(out, "Service: {}", api_key.service_name)?;
            writeln!(out, "Updated status: {}", api_key.status)?;
        }
        ApiKeyCommand::Show { service_name } => {
            let api_key = service.get_by_name(&service_name).await?;
            writeln!(out, "Service: {}", api_key.service_name)?;
            writeln!(out, "Status: {}", api_key.status)?;
            writeln!(out, "Key Prefix: {}", api_key.key_prefix)?;
            writeln!(
                out,
                "Created At: {}",
                api_key.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
            )?;
            writeln!(
                out,
                "Updated At: {}",
                api_key.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
            )?;
        }
        ApiKeyCommand::Delete { service_name } => {
            let deleted = service.delete_service_key(&service_name).await?;
            writeln!(out, "Deleted service key for: {}", deleted.service_name)?;
        }
    }

    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
