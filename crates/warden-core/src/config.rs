//! Configuration management for the relay.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default shared admin secret. Deployments must override this.
pub const DEFAULT_ADMIN_TOKEN: &str = "changeme";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Listen address for the HTTP boundary.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Shared secret for administrative routes (X-Admin-Token header).
    #[serde(default = "default_admin_token")]
    pub admin_token: String,
    /// Database file path. When absent, the default under the base
    /// directory is used.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_admin_token() -> String {
    DEFAULT_ADMIN_TOKEN.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            bind_addr: default_bind_addr(),
            admin_token: default_admin_token(),
            database_path: None,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file under `paths`, falling
    /// back to defaults, then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file under `paths`.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let config_path = paths.config_file();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("MODWARDEN_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(bind_addr) = std::env::var("MODWARDEN_BIND_ADDR") {
            self.bind_addr = bind_addr;
        }
        if let Ok(admin_token) = std::env::var("MODWARDEN_ADMIN_TOKEN") {
            self.admin_token = admin_token;
        }
        if let Ok(db_path) = std::env::var("MODWARDEN_DB_PATH") {
            self.database_path = Some(PathBuf::from(db_path));
        }
    }

    /// Get the listen address as a parsed socket address.
    pub fn bind_addr(&self) -> CoreResult<SocketAddr> {
        self.bind_addr
            .parse()
            .map_err(|e| CoreError::Config(format!("invalid bind_addr {:?}: {}", self.bind_addr, e)))
    }

    /// Resolve the database file path, falling back to the default
    /// location under the base directory.
    pub fn database_file(&self, paths: &Paths) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| paths.database_file())
    }
}
