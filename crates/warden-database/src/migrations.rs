//! Database migrations.
//!
//! Migrations are run in order and tracked in the `migrations` table.

use crate::DatabaseResult;
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> DatabaseResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    info!(current_version, target_version = CURRENT_VERSION, "Running migrations");

    if current_version < 1 {
        migrate_v1_initial_schema(conn)?;
    }

    info!("Migrations complete");
    Ok(())
}

fn record_migration(conn: &Connection, version: i32, name: &str) -> DatabaseResult<()> {
    conn.execute(
        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![version, name],
    )?;
    debug!(version, name, "Migration applied");
    Ok(())
}

/// V1: Initial schema - deaths, moderation actions, commands, player states.
fn migrate_v1_initial_schema(conn: &Connection) -> DatabaseResult<()> {
    info!("Applying migration v1: initial schema");

    // Death events. instance_id is the caller-supplied idempotency
    // key; AUTOINCREMENT keeps listing ids monotonic even across
    // deletes by external tooling.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS deaths (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            instance_id TEXT NOT NULL UNIQUE,
            attacker TEXT,
            victim TEXT NOT NULL,
            cause TEXT NOT NULL,
            pos_x REAL,
            pos_y REAL,
            pos_z REAL,
            occurred_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_deaths_victim
            ON deaths(victim);
        CREATE INDEX IF NOT EXISTS idx_deaths_attacker
            ON deaths(attacker);
        ",
    )?;

    // Append-only moderation audit log.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS mod_actions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            time TEXT NOT NULL,
            action TEXT NOT NULL,
            player TEXT NOT NULL,
            reason TEXT,
            extra_json TEXT
        );
        ",
    )?;

    // Live command queue. Rows exist from enqueue until acknowledge;
    // AUTOINCREMENT guarantees ids of acknowledged (deleted) commands
    // are never reused, keeping assignment strictly increasing.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS commands (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            time TEXT NOT NULL,
            command TEXT NOT NULL,
            payload_json TEXT NOT NULL
        );
        ",
    )?;

    // Current moderation state per player, one row each.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS player_states (
            player TEXT PRIMARY KEY,
            strikes INTEGER NOT NULL DEFAULT 0,
            banned INTEGER NOT NULL DEFAULT 0,
            vestige INTEGER NOT NULL DEFAULT 0,
            updated TEXT NOT NULL
        );
        ",
    )?;

    record_migration(conn, 1, "initial_schema")?;
    Ok(())
}
