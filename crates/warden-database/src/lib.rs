//! SQLite persistence layer for the modwarden relay.
//!
//! This crate provides:
//! - Async SQLite executor with a dedicated thread
//! - Database migrations
//! - Model types for all tables (deaths, commands, player states,
//!   moderation actions)
//! - Standalone query functions for CRUD operations
//!
//! # Architecture
//!
//! The `AsyncDatabase` uses a single dedicated thread for all SQLite
//! operations. Queries are sent through a channel and executed in FIFO
//! order, which linearizes writes (command id assignment in
//! particular) and keeps the Tokio runtime free for other work.
//!
//! ```ignore
//! let db = AsyncDatabase::open(path).await?;
//! let live = db.call(|conn| queries::poll_commands(conn, 25)).await?;
//! ```
//!
//! Only SQL operations should run inside `db.call()` — anything
//! CPU-heavy belongs outside the closure.

mod error;
mod executor;
mod migrations;
mod models;
pub mod queries;

pub use error::{DatabaseError, DatabaseResult};
pub use executor::AsyncDatabase;
pub use migrations::run_migrations;
pub use models::*;
