//! Durable command queue over the shared store.

use crate::QueueResult;
use chrono::Utc;
use tracing::debug;
use warden_database::{queries, AsyncDatabase, CommandBody, QueuedCommand};

/// Default page size for a poll.
pub const DEFAULT_POLL_LIMIT: usize = 25;

/// Durable queue of administrator commands awaiting the agent.
///
/// The store is the single source of truth: this type holds no
/// in-memory queue state, so there is nothing to diverge from the
/// persisted rows across restarts or concurrent handles. Each
/// operation is one store round-trip on the shared executor thread,
/// which linearizes id assignment across concurrent enqueuers.
#[derive(Clone)]
pub struct CommandQueue {
    db: AsyncDatabase,
}

impl CommandQueue {
    /// Create a queue over the shared database handle.
    pub fn new(db: AsyncDatabase) -> Self {
        Self { db }
    }

    /// Enqueue a command and return its store-assigned id.
    ///
    /// Ids are strictly increasing and never reused, even after the
    /// command is acknowledged and its row removed.
    pub async fn enqueue(&self, body: CommandBody) -> QueueResult<i64> {
        let (kind, payload) = body.to_parts()?;
        let payload_json = payload.to_string();
        let enqueued_at = Utc::now();

        let id = self
            .db
            .call(move |conn| queries::enqueue_command(conn, kind, &payload_json, enqueued_at))
            .await?;

        debug!(id, kind, "Command enqueued");
        Ok(id)
    }

    /// Read up to `max_items` live commands in ascending id order.
    ///
    /// Side-effect-free: repeated polls with no intervening enqueue or
    /// acknowledge return the same set. A command observed here stays
    /// live until [`acknowledge`](Self::acknowledge) names it, so the
    /// agent must tolerate seeing a command more than once.
    pub async fn poll(&self, max_items: usize) -> QueueResult<Vec<QueuedCommand>> {
        let commands = self
            .db
            .call(move |conn| queries::poll_commands(conn, max_items))
            .await?;
        Ok(commands)
    }

    /// Retire the named commands from the live set.
    ///
    /// Acknowledging an already-removed or never-issued id is a no-op,
    /// which makes the call safe to retry with overlapping id sets
    /// from a crashed-and-restarted agent. Returns the number of
    /// commands actually removed.
    pub async fn acknowledge(&self, ids: &[i64]) -> QueueResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids = ids.to_vec();
        let requested = ids.len();

        let removed = self
            .db
            .call(move |conn| queries::ack_commands(conn, &ids))
            .await?;

        debug!(requested, removed, "Commands acknowledged");
        Ok(removed)
    }
}
