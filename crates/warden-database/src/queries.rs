//! Standalone query functions that work with any Connection.
//!
//! Each function takes a `&Connection` as its first parameter and is
//! expected to run inside `AsyncDatabase::call`. Every function is a
//! single statement (or a single implicit transaction), so a failed
//! call never leaves a partial write visible.

use crate::{
    CommandBody, DatabaseResult, DeathEvent, ModerationAction, NewDeathEvent,
    NewModerationAction, PlayerState, Position, QueuedCommand,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

// ==========================================
// Deaths
// ==========================================

const DEATH_COLUMNS: &str =
    "id, instance_id, attacker, victim, cause, pos_x, pos_y, pos_z, occurred_at";

/// Insert or fully replace a death event, keyed by `instance_id`.
///
/// A re-submission with the same key overwrites every field in one
/// atomic conditional write; the row id is preserved, so listing
/// order reflects first ingestion.
pub fn upsert_death(
    conn: &Connection,
    event: &NewDeathEvent,
    occurred_at: DateTime<Utc>,
) -> DatabaseResult<()> {
    let (pos_x, pos_y, pos_z) = match event.position {
        Some(Position { x, y, z }) => (Some(x), Some(y), Some(z)),
        None => (None, None, None),
    };
    conn.execute(
        "INSERT INTO deaths (instance_id, attacker, victim, cause, pos_x, pos_y, pos_z, occurred_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(instance_id) DO UPDATE SET
             attacker = excluded.attacker,
             victim = excluded.victim,
             cause = excluded.cause,
             pos_x = excluded.pos_x,
             pos_y = excluded.pos_y,
             pos_z = excluded.pos_z,
             occurred_at = excluded.occurred_at",
        params![
            event.instance_id,
            event.attacker,
            event.victim,
            event.cause,
            pos_x,
            pos_y,
            pos_z,
            occurred_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// List death events, newest first.
pub fn list_deaths(conn: &Connection, offset: i64, limit: i64) -> DatabaseResult<Vec<DeathEvent>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {DEATH_COLUMNS} FROM deaths ORDER BY id DESC LIMIT ?1 OFFSET ?2"
    ))?;

    let deaths = stmt
        .query_map(params![limit, offset], death_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(deaths)
}

/// List death events where the player appears as attacker or victim,
/// newest first.
pub fn list_deaths_for_player(
    conn: &Connection,
    player: &str,
    offset: i64,
    limit: i64,
) -> DatabaseResult<Vec<DeathEvent>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {DEATH_COLUMNS} FROM deaths
         WHERE victim = ?1 OR attacker = ?1
         ORDER BY id DESC LIMIT ?2 OFFSET ?3"
    ))?;

    let deaths = stmt
        .query_map(params![player, limit, offset], death_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(deaths)
}

/// Get a death event by its instance id.
pub fn get_death_by_instance(
    conn: &Connection,
    instance_id: &str,
) -> DatabaseResult<Option<DeathEvent>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {DEATH_COLUMNS} FROM deaths WHERE instance_id = ?1"
    ))?;

    let result = stmt.query_row(params![instance_id], death_from_row);

    match result {
        Ok(event) => Ok(Some(event)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn death_from_row(row: &Row<'_>) -> rusqlite::Result<DeathEvent> {
    let pos_x: Option<f64> = row.get(5)?;
    let pos_y: Option<f64> = row.get(6)?;
    let pos_z: Option<f64> = row.get(7)?;
    let position = match (pos_x, pos_y, pos_z) {
        (Some(x), Some(y), Some(z)) => Some(Position { x, y, z }),
        _ => None,
    };
    Ok(DeathEvent {
        id: row.get(0)?,
        instance_id: row.get(1)?,
        attacker: row.get(2)?,
        victim: row.get(3)?,
        cause: row.get(4)?,
        position,
        occurred_at: parse_datetime(row.get::<_, String>(8)?),
    })
}

// ==========================================
// Commands
// ==========================================

/// Insert a command row and return the store-assigned id.
pub fn enqueue_command(
    conn: &Connection,
    kind: &str,
    payload_json: &str,
    enqueued_at: DateTime<Utc>,
) -> DatabaseResult<i64> {
    conn.execute(
        "INSERT INTO commands (time, command, payload_json) VALUES (?1, ?2, ?3)",
        params![enqueued_at.to_rfc3339(), kind, payload_json],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Read up to `limit` live commands in ascending id order.
///
/// Read-only: rows stay live until [`ack_commands`] removes them.
pub fn poll_commands(conn: &Connection, limit: usize) -> DatabaseResult<Vec<QueuedCommand>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, time, command, payload_json FROM commands ORDER BY id ASC LIMIT ?1",
    )?;

    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut commands = Vec::with_capacity(rows.len());
    for (id, time, kind, payload_json) in rows {
        let payload: serde_json::Value = serde_json::from_str(&payload_json)?;
        let body = CommandBody::from_parts(&kind, payload)?;
        commands.push(QueuedCommand {
            id,
            enqueued_at: parse_datetime(time),
            body,
        });
    }

    Ok(commands)
}

/// Delete the named commands from the live set in one statement.
///
/// Unknown or already-removed ids are skipped silently; returns the
/// number of rows actually removed.
pub fn ack_commands(conn: &Connection, ids: &[i64]) -> DatabaseResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let placeholders = std::iter::repeat("?").take(ids.len()).collect::<Vec<_>>().join(", ");
    let sql = format!("DELETE FROM commands WHERE id IN ({})", placeholders);

    let mut params_vec: Vec<&dyn rusqlite::ToSql> = Vec::with_capacity(ids.len());
    for id in ids {
        params_vec.push(id);
    }

    let count = conn.execute(&sql, params_vec.as_slice())?;
    Ok(count)
}

// ==========================================
// Player states
// ==========================================

/// Insert or fully overwrite the state row for one player.
pub fn upsert_player_state(
    conn: &Connection,
    player: &str,
    strikes: i64,
    banned: bool,
    vestige: i64,
    updated_at: DateTime<Utc>,
) -> DatabaseResult<()> {
    conn.execute(
        "INSERT INTO player_states (player, strikes, banned, vestige, updated)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(player) DO UPDATE SET
             strikes = ?2, banned = ?3, vestige = ?4, updated = ?5",
        params![player, strikes, banned, vestige, updated_at.to_rfc3339()],
    )?;
    Ok(())
}

/// Get the stored state for a player, if any.
pub fn get_player_state(conn: &Connection, player: &str) -> DatabaseResult<Option<PlayerState>> {
    let mut stmt = conn.prepare_cached(
        "SELECT player, strikes, banned, vestige, updated FROM player_states WHERE player = ?1",
    )?;

    let result = stmt.query_row(params![player], |row| {
        Ok(PlayerState {
            player: row.get(0)?,
            strikes: row.get(1)?,
            banned: row.get(2)?,
            vestige: row.get(3)?,
            updated_at: Some(parse_datetime(row.get::<_, String>(4)?)),
        })
    });

    match result {
        Ok(state) => Ok(Some(state)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ==========================================
// Moderation actions
// ==========================================

/// Append a moderation audit entry.
pub fn insert_mod_action(
    conn: &Connection,
    action: &NewModerationAction,
    time: DateTime<Utc>,
) -> DatabaseResult<()> {
    let extra_json = match &action.extra {
        Some(extra) => Some(serde_json::to_string(extra)?),
        None => None,
    };
    conn.execute(
        "INSERT INTO mod_actions (time, action, player, reason, extra_json)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![time.to_rfc3339(), action.action, action.player, action.reason, extra_json],
    )?;
    Ok(())
}

/// List moderation audit entries, newest first.
pub fn list_mod_actions(
    conn: &Connection,
    offset: i64,
    limit: i64,
) -> DatabaseResult<Vec<ModerationAction>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, time, action, player, reason, extra_json
         FROM mod_actions ORDER BY id DESC LIMIT ?1 OFFSET ?2",
    )?;

    let rows = stmt
        .query_map(params![limit, offset], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut actions = Vec::with_capacity(rows.len());
    for (id, time, action, player, reason, extra_json) in rows {
        let extra = match extra_json {
            Some(raw) => Some(serde_json::from_str(&raw)?),
            None => None,
        };
        actions.push(ModerationAction {
            id,
            time: parse_datetime(time),
            action,
            player,
            reason,
            extra,
        });
    }

    Ok(actions)
}

// ==========================================
// Helpers
// ==========================================

/// Parse an RFC3339 datetime string, falling back to current time on error.
fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
