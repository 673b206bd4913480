//! Last-writer-wins player state reconciliation.

use crate::{ModerationError, ModerationResult};
use chrono::Utc;
use tracing::debug;
use warden_database::{queries, AsyncDatabase, PlayerState};

/// Maintains current moderation state per player as reported by the
/// agent.
#[derive(Clone)]
pub struct StateReconciler {
    db: AsyncDatabase,
}

impl StateReconciler {
    /// Create a reconciler over the shared database handle.
    pub fn new(db: AsyncDatabase) -> Self {
        Self { db }
    }

    /// Fully overwrite the stored state for one player.
    ///
    /// The caller owns producing the complete new state; there is no
    /// partial merge. The write is a single atomic insert-or-update,
    /// never read-then-write.
    pub async fn upsert(
        &self,
        player: &str,
        strikes: i64,
        banned: bool,
        vestige: i64,
    ) -> ModerationResult<()> {
        if player.is_empty() {
            return Err(ModerationError::Validation("player must not be empty".to_string()));
        }
        if strikes < 0 {
            return Err(ModerationError::Validation("strikes must be non-negative".to_string()));
        }

        let player_owned = player.to_string();
        let updated_at = Utc::now();
        self.db
            .call(move |conn| {
                queries::upsert_player_state(conn, &player_owned, strikes, banned, vestige, updated_at)
            })
            .await?;

        debug!(player, strikes, banned, vestige, "Player state updated");
        Ok(())
    }

    /// Get the stored state for a player, or the zero-value default
    /// when no row exists.
    pub async fn get(&self, player: &str) -> ModerationResult<PlayerState> {
        let player_owned = player.to_string();
        let stored = self
            .db
            .call(move |conn| queries::get_player_state(conn, &player_owned))
            .await?;
        Ok(stored.unwrap_or_else(|| PlayerState::absent(player)))
    }
}
