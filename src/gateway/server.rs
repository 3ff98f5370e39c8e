// Ballpark - HTTP Server
//
// Builds the axum router and runs it until shutdown. `/api/health` is
// public. Everything else, unmatched paths included, sits behind the API
// key gate, so an unauthenticated caller learns nothing about which routes
// exist.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth::{require_api_key, GateState};
use super::protocol::{HealthResponse, SuccessResponse};
use crate::api_keys::{ApiClient, ApiKeyPublic, ApiKeysService};
use crate::error::ApiError;
use crate::leagues::{League, LeagueInput, LeaguesService};
use crate::players::{Player, PlayersService};

#[derive(Clone)]
pub struct AppState {
    keys: ApiKeysService,
    players: PlayersService,
    leagues: LeaguesService,
    gate: GateState,
}

impl AppState {
    pub fn new(
        keys: ApiKeysService,
        players: PlayersService,
        leagues: LeaguesService,
        disable_api_key_auth: bool,
    ) -> Self {
        let gate = GateState::new(Arc::new(keys.clone()), disable_api_key_auth);
        Self {
            keys,
            players,
            leagues,
            gate,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // `layer` rather than `route_layer`: the fallback is gated too.
    let protected = Router::new()
        .nest("/api/api-keys", Router::new().route("/me", get(me)))
        .nest("/api/players", Router::new().route("/{id}", get(get_player)))
        .nest(
            "/api/leagues",
            Router::new()
                .route("/", post(upsert_league))
                .route("/{id}", get(get_league)),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.gate.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/api/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `0.0.0.0:port` and serve until Ctrl-C or until `shutdown` is
/// cancelled. A Ctrl-C also cancels `shutdown` so sibling tasks stop.
pub async fn serve(state: AppState, port: u16, shutdown: CancellationToken) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl-C handler");
                shutdown.cancelled().await;
            }
        },
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// The calling service's own record.
async fn me(
    State(state): State<AppState>,
    client: ApiClient,
) -> Result<Json<SuccessResponse<ApiKeyPublic>>, ApiError> {
    let record = state.keys.get_by_id(&client.key_id.to_string()).await?;
    Ok(Json(SuccessResponse::new(record)))
}

async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse<Player>>, ApiError> {
    let player = state.players.get_player_by_id(&id).await?;
    Ok(Json(SuccessResponse::new(player)))
}

async fn get_league(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse<League>>, ApiError> {
    let league = state.leagues.get_league_by_id(&id).await?;
    Ok(Json(SuccessResponse::new(league)))
}

/// Create or replace a league keyed on its `externalId`.
async fn upsert_league(
    State(state): State<AppState>,
    payload: Result<Json<LeagueInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SuccessResponse<League>>), ApiError> {
    let Json(input) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let league = state.leagues.upsert_league(input).await?;
    Ok((StatusCode::CREATED, Json(SuccessResponse::new(league))))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
