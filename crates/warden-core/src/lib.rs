//! Core configuration and utilities for the modwarden relay.
//!
//! This crate provides:
//! - Configuration loading (file + environment overrides)
//! - File system path management
//! - Logging initialization
//! - Core error types

mod config;
mod error;
mod logging;
mod paths;

pub use config::{Config, DEFAULT_ADMIN_TOKEN, DEFAULT_BIND_ADDR, DEFAULT_LOG_LEVEL};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
