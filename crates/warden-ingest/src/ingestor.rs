//! Idempotent death-event recording and queries.

use crate::{IngestError, IngestResult};
use chrono::Utc;
use tracing::debug;
use warden_database::{queries, AsyncDatabase, DeathEvent, NewDeathEvent};

/// Default page size for listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Ingests death events reported by the agent.
#[derive(Clone)]
pub struct DeathIngestor {
    db: AsyncDatabase,
}

impl DeathIngestor {
    /// Create an ingestor over the shared database handle.
    pub fn new(db: AsyncDatabase) -> Self {
        Self { db }
    }

    /// Record a death event, upserting on `instance_id`.
    ///
    /// A re-submission with the same key fully replaces the stored
    /// fields — exactly one record per instance id, whatever the
    /// retry count. When `occurred_at` is absent it defaults to the
    /// ingestion wall-clock, resolved once per call: a retry that
    /// omits the timestamp will shift that one field (and nothing
    /// else), matching the agent's fire-and-forget reporting.
    pub async fn record(&self, event: NewDeathEvent) -> IngestResult<()> {
        if event.instance_id.is_empty() {
            return Err(IngestError::Validation("instance_id must not be empty".to_string()));
        }
        if event.victim.is_empty() {
            return Err(IngestError::Validation("victim must not be empty".to_string()));
        }
        if event.cause.is_empty() {
            return Err(IngestError::Validation("cause must not be empty".to_string()));
        }

        let occurred_at = event.occurred_at.unwrap_or_else(Utc::now);
        let instance_id = event.instance_id.clone();

        self.db
            .call(move |conn| queries::upsert_death(conn, &event, occurred_at))
            .await?;

        debug!(%instance_id, "Death event recorded");
        Ok(())
    }

    /// List recorded events, newest first.
    pub async fn list(&self, offset: i64, limit: i64) -> IngestResult<Vec<DeathEvent>> {
        let deaths = self
            .db
            .call(move |conn| queries::list_deaths(conn, offset, limit))
            .await?;
        Ok(deaths)
    }

    /// List events where the player appears as attacker or victim,
    /// newest first.
    pub async fn list_for_player(
        &self,
        player: &str,
        offset: i64,
        limit: i64,
    ) -> IngestResult<Vec<DeathEvent>> {
        if player.is_empty() {
            return Err(IngestError::Validation("player must not be empty".to_string()));
        }
        let player = player.to_string();
        let deaths = self
            .db
            .call(move |conn| queries::list_deaths_for_player(conn, &player, offset, limit))
            .await?;
        Ok(deaths)
    }

    /// Fetch a single event by instance id; `None` when absent.
    pub async fn get(&self, instance_id: &str) -> IngestResult<Option<DeathEvent>> {
        let instance_id = instance_id.to_string();
        let death = self
            .db
            .call(move |conn| queries::get_death_by_instance(conn, &instance_id))
            .await?;
        Ok(death)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use warden_database::Position;

    async fn ingestor() -> DeathIngestor {
        DeathIngestor::new(AsyncDatabase::open_in_memory().await.unwrap())
    }

    fn event(instance_id: &str, victim: &str, cause: &str) -> NewDeathEvent {
        NewDeathEvent {
            instance_id: instance_id.to_string(),
            attacker: None,
            victim: victim.to_string(),
            cause: cause.to_string(),
            position: None,
            occurred_at: None,
        }
    }

    #[tokio::test]
    async fn test_record_and_get() {
        let ingestor = ingestor().await;
        let mut ev = event("e1", "bob", "fall");
        ev.attacker = Some("alice".to_string());
        ev.position = Some(Position { x: 0.0, y: 70.0, z: 12.5 });

        ingestor.record(ev).await.unwrap();

        let stored = ingestor.get("e1").await.unwrap().unwrap();
        assert_eq!(stored.victim, "bob");
        assert_eq!(stored.attacker.as_deref(), Some("alice"));
        assert_eq!(stored.position, Some(Position { x: 0.0, y: 70.0, z: 12.5 }));
    }

    #[tokio::test]
    async fn test_resubmission_replaces_not_duplicates() {
        let ingestor = ingestor().await;

        ingestor.record(event("e1", "bob", "fall")).await.unwrap();
        ingestor.record(event("e1", "bob", "fire")).await.unwrap();

        let stored = ingestor.get("e1").await.unwrap().unwrap();
        assert_eq!(stored.cause, "fire");

        let all = ingestor.list(0, 50).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_timestamp_defaults_to_ingestion_time() {
        let ingestor = ingestor().await;

        let before = Utc::now();
        ingestor.record(event("e1", "bob", "fall")).await.unwrap();
        let after = Utc::now();

        let stored = ingestor.get("e1").await.unwrap().unwrap();
        assert!(stored.occurred_at >= before - Duration::seconds(1));
        assert!(stored.occurred_at <= after + Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_explicit_timestamp_survives_retry() {
        let ingestor = ingestor().await;
        let when: DateTime<Utc> = "2026-07-01T12:00:00Z".parse().unwrap();

        let mut ev = event("e1", "bob", "fall");
        ev.occurred_at = Some(when);
        ingestor.record(ev.clone()).await.unwrap();
        ingestor.record(ev).await.unwrap();

        let stored = ingestor.get("e1").await.unwrap().unwrap();
        assert_eq!(stored.occurred_at, when);
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_fields() {
        let ingestor = ingestor().await;

        for ev in [
            event("", "bob", "fall"),
            event("e1", "", "fall"),
            event("e1", "bob", ""),
        ] {
            let err = ingestor.record(ev).await.unwrap_err();
            assert!(matches!(err, IngestError::Validation(_)));
        }

        // Nothing reached the store.
        assert!(ingestor.list(0, 50).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_pagination() {
        let ingestor = ingestor().await;
        for i in 1..=5 {
            ingestor
                .record(event(&format!("e{i}"), "bob", "fall"))
                .await
                .unwrap();
        }

        let page = ingestor.list(0, 2).await.unwrap();
        assert_eq!(page[0].instance_id, "e5");
        assert_eq!(page[1].instance_id, "e4");

        let next = ingestor.list(2, 2).await.unwrap();
        assert_eq!(next[0].instance_id, "e3");
    }

    #[tokio::test]
    async fn test_list_for_player_matches_either_side() {
        let ingestor = ingestor().await;

        let mut killed_by_carol = event("e1", "victim1", "sword");
        killed_by_carol.attacker = Some("carol".to_string());
        ingestor.record(killed_by_carol).await.unwrap();
        ingestor.record(event("e2", "carol", "fall")).await.unwrap();
        ingestor.record(event("e3", "other", "fall")).await.unwrap();

        let deaths = ingestor.list_for_player("carol", 0, 50).await.unwrap();
        let ids: Vec<_> = deaths.iter().map(|d| d.instance_id.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e1"]);
    }

    #[tokio::test]
    async fn test_list_for_player_rejects_empty() {
        let ingestor = ingestor().await;
        let err = ingestor.list_for_player("", 0, 50).await.unwrap_err();
        assert!(matches!(err, IngestError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let ingestor = ingestor().await;
        assert!(ingestor.get("nope").await.unwrap().is_none());
    }
}
