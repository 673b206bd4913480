//! Append-only moderation audit log.

use crate::{ModerationError, ModerationResult};
use chrono::Utc;
use tracing::debug;
use warden_database::{queries, AsyncDatabase, ModerationAction, NewModerationAction};

/// Records administrative moderation actions for later audit.
///
/// Entries are never mutated or deleted by this subsystem.
#[derive(Clone)]
pub struct ActionLog {
    db: AsyncDatabase,
}

impl ActionLog {
    /// Create an action log over the shared database handle.
    pub fn new(db: AsyncDatabase) -> Self {
        Self { db }
    }

    /// Append one audit entry stamped with the current time.
    pub async fn record(&self, action: NewModerationAction) -> ModerationResult<()> {
        if action.action.is_empty() {
            return Err(ModerationError::Validation("action must not be empty".to_string()));
        }
        if action.player.is_empty() {
            return Err(ModerationError::Validation("player must not be empty".to_string()));
        }

        let time = Utc::now();
        let kind = action.action.clone();
        self.db
            .call(move |conn| queries::insert_mod_action(conn, &action, time))
            .await?;

        debug!(action = %kind, "Moderation action recorded");
        Ok(())
    }

    /// List audit entries, newest first.
    pub async fn list(&self, offset: i64, limit: i64) -> ModerationResult<Vec<ModerationAction>> {
        let actions = self
            .db
            .call(move |conn| queries::list_mod_actions(conn, offset, limit))
            .await?;
        Ok(actions)
    }
}
