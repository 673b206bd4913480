//! Death-event ingestion for the relay.
//!
//! The agent reports each in-game death once per real-world
//! occurrence, but the transport is retried HTTP — so the same event
//! may arrive more than once. Every submission carries a
//! caller-supplied `instance_id`, and ingestion upserts on that key:
//! re-delivery replaces the stored record instead of duplicating it.

mod error;
mod ingestor;

pub use error::{IngestError, IngestResult};
pub use ingestor::{DeathIngestor, DEFAULT_PAGE_LIMIT};
