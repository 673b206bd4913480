//! Request and response types for the HTTP boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use warden_database::{NewDeathEvent, Position, QueuedCommand};
use warden_ingest::DEFAULT_PAGE_LIMIT;
use warden_queue::DEFAULT_POLL_LIMIT;

/// Death report submitted by the agent.
#[derive(Debug, Deserialize)]
pub struct DeathEventRequest {
    pub instance_id: String,
    #[serde(default)]
    pub attacker: Option<String>,
    pub victim: String,
    pub cause: String,
    #[serde(default)]
    pub position: Option<Position>,
    /// Event time as reported by the game server; ingestion time when
    /// absent.
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

impl DeathEventRequest {
    pub fn into_event(self) -> NewDeathEvent {
        NewDeathEvent {
            instance_id: self.instance_id,
            attacker: self.attacker,
            victim: self.victim,
            cause: self.cause,
            position: self.position,
            occurred_at: self.time,
        }
    }
}

/// Moderation audit entry submitted by an administrator.
#[derive(Debug, Deserialize)]
pub struct ModActionRequest {
    pub action: String,
    pub player: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub extra: Option<serde_json::Value>,
}

/// Single-player command request (strike/ban/unban/kick).
#[derive(Debug, Deserialize)]
pub struct PlayerTargetRequest {
    pub player: String,
}

/// Restore command request.
#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub player: String,
    pub amount: i64,
}

/// Complete player state snapshot reported by the agent.
#[derive(Debug, Deserialize)]
pub struct PlayerStateRequest {
    pub player: String,
    #[serde(default)]
    pub strikes: i64,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub banned: bool,
    #[serde(default)]
    pub vestige: i64,
}

/// The agent mod reports `banned` as either a bool or a 0/1 integer.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrInt {
        Bool(bool),
        Int(i64),
    }

    Ok(match BoolOrInt::deserialize(deserializer)? {
        BoolOrInt::Bool(b) => b,
        BoolOrInt::Int(i) => i != 0,
    })
}

/// Acknowledgment of applied commands.
#[derive(Debug, Deserialize)]
pub struct AckRequest {
    pub ids: Vec<i64>,
}

/// Query parameters for a command poll.
#[derive(Debug, Deserialize)]
pub struct PollParams {
    #[serde(default = "default_poll_limit")]
    pub limit: usize,
}

fn default_poll_limit() -> usize {
    DEFAULT_POLL_LIMIT
}

/// Offset/limit pagination for listings.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_page_limit")]
    pub limit: i64,
}

fn default_page_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

/// Query parameter naming a player.
#[derive(Debug, Deserialize)]
pub struct PlayerParams {
    pub player: String,
}

/// One live command as handed to the polling agent.
#[derive(Debug, Serialize)]
pub struct CommandItem {
    pub id: i64,
    pub kind: String,
    pub payload: serde_json::Value,
}

impl CommandItem {
    pub fn from_queued(cmd: QueuedCommand) -> serde_json::Result<Self> {
        let (kind, payload) = cmd.body.to_parts()?;
        Ok(Self {
            id: cmd.id,
            kind: kind.to_string(),
            payload,
        })
    }
}
