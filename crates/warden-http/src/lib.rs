//! HTTP boundary for the modwarden relay.
//!
//! A thin axum layer mapping requests onto the service crates. The
//! core protocol (enqueue/poll/acknowledge, idempotent death
//! ingestion, state upsert) lives below this crate; handlers here
//! only decode requests, enforce the shared-secret admin gate, and
//! wrap results in the `{"ok": ...}` envelope the agent expects.

mod error;
mod handlers;
mod wire;

pub use error::ApiError;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use warden_database::AsyncDatabase;
use warden_ingest::DeathIngestor;
use warden_moderation::{ActionLog, StateReconciler};
use warden_queue::CommandQueue;

/// Header carrying the shared admin secret.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Shared handler state (thread-safe).
#[derive(Clone)]
pub struct AppState {
    /// Async database executor, used directly only for health checks.
    pub db: AsyncDatabase,
    pub queue: CommandQueue,
    pub deaths: DeathIngestor,
    pub players: StateReconciler,
    pub actions: ActionLog,
    admin_token: Arc<String>,
}

impl AppState {
    /// Wire up all services over one shared database handle.
    pub fn new(db: AsyncDatabase, admin_token: impl Into<String>) -> Self {
        Self {
            queue: CommandQueue::new(db.clone()),
            deaths: DeathIngestor::new(db.clone()),
            players: StateReconciler::new(db.clone()),
            actions: ActionLog::new(db.clone()),
            db,
            admin_token: Arc::new(admin_token.into()),
        }
    }

    /// Check the shared-secret header on administrative routes.
    ///
    /// Runs before any store interaction; a mismatch is reported
    /// distinctly from validation and store errors.
    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let presented = headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if presented != self.admin_token.as_str() {
            return Err(ApiError::Unauthorized);
        }
        Ok(())
    }
}

/// Build the relay router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/death", post(handlers::record_death))
        .route("/deaths", get(handlers::list_deaths))
        .route("/deaths/player/:player", get(handlers::list_deaths_for_player))
        .route("/deaths/instance/:instance_id", get(handlers::get_death))
        .route("/mod/action", post(handlers::record_mod_action))
        .route("/mod/actions", get(handlers::list_mod_actions))
        .route("/command/restore", post(handlers::command_restore))
        .route("/command/strike", post(handlers::command_strike))
        .route("/command/ban", post(handlers::command_ban))
        .route("/command/unban", post(handlers::command_unban))
        .route("/command/kick", post(handlers::command_kick))
        .route("/commands/poll", get(handlers::poll_commands))
        .route("/commands/ack", post(handlers::ack_commands))
        .route("/player/state", post(handlers::upsert_player_state).get(handlers::get_player_state))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Relay listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
    }
    info!("Shutdown signal received");
}
