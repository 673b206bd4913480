//! Route handlers.

use crate::error::ApiError;
use crate::wire::{
    AckRequest, CommandItem, DeathEventRequest, ModActionRequest, PageParams, PlayerParams,
    PlayerStateRequest, PlayerTargetRequest, PollParams, RestoreRequest,
};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use warden_database::{CommandBody, NewModerationAction};

pub async fn healthz(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.db.health_check().await?;
    Ok(Json(json!({"ok": true})))
}

// ==========================================
// Deaths
// ==========================================

pub async fn record_death(
    State(state): State<AppState>,
    Json(req): Json<DeathEventRequest>,
) -> Result<Json<Value>, ApiError> {
    let instance_id = req.instance_id.clone();
    state.deaths.record(req.into_event()).await?;
    Ok(Json(json!({"ok": true, "instance_id": instance_id})))
}

pub async fn list_deaths(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let results = state.deaths.list(page.offset, page.limit).await?;
    Ok(Json(json!({"ok": true, "results": results})))
}

pub async fn list_deaths_for_player(
    State(state): State<AppState>,
    Path(player): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let results = state
        .deaths
        .list_for_player(&player, page.offset, page.limit)
        .await?;
    Ok(Json(json!({"ok": true, "results": results})))
}

pub async fn get_death(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let event = state
        .deaths
        .get(&instance_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(json!({"ok": true, "result": event})))
}

// ==========================================
// Moderation actions
// ==========================================

pub async fn record_mod_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ModActionRequest>,
) -> Result<Json<Value>, ApiError> {
    state.authorize(&headers)?;
    state
        .actions
        .record(NewModerationAction {
            action: req.action,
            player: req.player,
            reason: req.reason,
            extra: req.extra,
        })
        .await?;
    Ok(Json(json!({"ok": true})))
}

pub async fn list_mod_actions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(page): Query<PageParams>,
) -> Result<Json<Value>, ApiError> {
    state.authorize(&headers)?;
    let results = state.actions.list(page.offset, page.limit).await?;
    Ok(Json(json!({"ok": true, "results": results})))
}

// ==========================================
// Commands
// ==========================================

async fn enqueue(state: &AppState, headers: &HeaderMap, body: CommandBody) -> Result<Json<Value>, ApiError> {
    state.authorize(headers)?;
    let id = state.queue.enqueue(body).await?;
    Ok(Json(json!({"ok": true, "id": id})))
}

pub async fn command_restore(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RestoreRequest>,
) -> Result<Json<Value>, ApiError> {
    enqueue(
        &state,
        &headers,
        CommandBody::Restore {
            player: req.player,
            amount: req.amount,
        },
    )
    .await
}

pub async fn command_strike(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PlayerTargetRequest>,
) -> Result<Json<Value>, ApiError> {
    enqueue(&state, &headers, CommandBody::Strike { player: req.player }).await
}

pub async fn command_ban(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PlayerTargetRequest>,
) -> Result<Json<Value>, ApiError> {
    enqueue(&state, &headers, CommandBody::Ban { player: req.player }).await
}

pub async fn command_unban(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PlayerTargetRequest>,
) -> Result<Json<Value>, ApiError> {
    enqueue(&state, &headers, CommandBody::Unban { player: req.player }).await
}

pub async fn command_kick(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PlayerTargetRequest>,
) -> Result<Json<Value>, ApiError> {
    enqueue(&state, &headers, CommandBody::Kick { player: req.player }).await
}

pub async fn poll_commands(
    State(state): State<AppState>,
    Query(params): Query<PollParams>,
) -> Result<Json<Value>, ApiError> {
    let live = state.queue.poll(params.limit).await?;
    let results = live
        .into_iter()
        .map(CommandItem::from_queued)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::Store(e.to_string()))?;
    Ok(Json(json!({"ok": true, "results": results})))
}

pub async fn ack_commands(
    State(state): State<AppState>,
    Json(req): Json<AckRequest>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.queue.acknowledge(&req.ids).await?;
    Ok(Json(json!({"ok": true, "removed": removed})))
}

// ==========================================
// Player state
// ==========================================

pub async fn upsert_player_state(
    State(state): State<AppState>,
    Json(req): Json<PlayerStateRequest>,
) -> Result<Json<Value>, ApiError> {
    state
        .players
        .upsert(&req.player, req.strikes, req.banned, req.vestige)
        .await?;
    Ok(Json(json!({"ok": true})))
}

pub async fn get_player_state(
    State(state): State<AppState>,
    Query(params): Query<PlayerParams>,
) -> Result<Json<Value>, ApiError> {
    let result = state.players.get(&params.player).await?;
    Ok(Json(json!({"ok": true, "result": result})))
}
