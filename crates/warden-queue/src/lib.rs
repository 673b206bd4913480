//! Command delivery queue for the polling agent.
//!
//! Administrators enqueue commands; the agent, which cannot accept
//! pushed connections, polls for the live set and acknowledges what
//! it has applied. Delivery is at-least-once and ordered: a command
//! stays live (and re-deliverable) until explicitly acknowledged, so
//! a crash between poll and apply simply causes redelivery.

mod error;
mod queue;

pub use error::{QueueError, QueueResult};
pub use queue::{CommandQueue, DEFAULT_POLL_LIMIT};
