//! Database model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// World position where a death occurred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Stored death event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathEvent {
    pub id: i64,
    pub instance_id: String,
    pub attacker: Option<String>,
    pub victim: String,
    pub cause: String,
    pub position: Option<Position>,
    pub occurred_at: DateTime<Utc>,
}

/// Incoming death event, prior to storage.
///
/// `occurred_at` is optional on the way in; the ingestor resolves it
/// to the ingestion wall-clock when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDeathEvent {
    pub instance_id: String,
    pub attacker: Option<String>,
    pub victim: String,
    pub cause: String,
    pub position: Option<Position>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Administrative command body, a tagged variant keyed by kind.
///
/// Serializes on the wire as `{"kind": "...", "payload": {...}}` —
/// the flexible mapping format the agent consumes, with a
/// strongly-typed field set per kind on this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "lowercase")]
pub enum CommandBody {
    Restore { player: String, amount: i64 },
    Strike { player: String },
    Ban { player: String },
    Unban { player: String },
    Kick { player: String },
}

impl CommandBody {
    /// The kind discriminant as stored in the `command` column.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Restore { .. } => "restore",
            Self::Strike { .. } => "strike",
            Self::Ban { .. } => "ban",
            Self::Unban { .. } => "unban",
            Self::Kick { .. } => "kick",
        }
    }

    /// Split into the stored (kind, payload) column pair.
    pub fn to_parts(&self) -> serde_json::Result<(&'static str, serde_json::Value)> {
        let value = serde_json::to_value(self)?;
        let payload = value
            .get("payload")
            .cloned()
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
        Ok((self.kind(), payload))
    }

    /// Rebuild from the stored (kind, payload) column pair.
    pub fn from_parts(kind: &str, payload: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(serde_json::json!({ "kind": kind, "payload": payload }))
    }
}

/// A live command as handed to the polling agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedCommand {
    pub id: i64,
    pub enqueued_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: CommandBody,
}

/// Current moderation state for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub player: String,
    pub strikes: i64,
    pub banned: bool,
    pub vestige: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PlayerState {
    /// Zero-value state reported for players with no stored row.
    pub fn absent(player: &str) -> Self {
        Self {
            player: player.to_string(),
            strikes: 0,
            banned: false,
            vestige: 0,
            updated_at: None,
        }
    }
}

/// Stored moderation audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationAction {
    pub id: i64,
    pub time: DateTime<Utc>,
    pub action: String,
    pub player: String,
    pub reason: Option<String>,
    pub extra: Option<serde_json::Value>,
}

/// Incoming moderation audit entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewModerationAction {
    pub action: String,
    pub player: String,
    pub reason: Option<String>,
    pub extra: Option<serde_json::Value>,
}
