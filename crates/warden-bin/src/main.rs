//! Modwarden relay daemon - persists game telemetry and brokers
//! administrator commands to the polling agent.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use warden_core::{init_logging, Config, Paths, DEFAULT_ADMIN_TOKEN};
use warden_database::AsyncDatabase;
use warden_http::AppState;

/// Modwarden relay command-line interface.
#[derive(Parser)]
#[command(name = "modwarden")]
#[command(about = "Relay between a game-server mod and administrative tooling")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Base directory for runtime files (config, database). Defaults to ~/.modwarden
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server (default)
    Serve {
        /// Listen address override (host:port)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let mut config = Config::load(&paths)?;

    let bind_override = match cli.command {
        Some(Commands::Serve { bind }) => bind,
        None => None,
    };
    if let Some(bind) = bind_override {
        config.bind_addr = bind;
    }

    run_server(config, paths).await
}

async fn run_server(config: Config, paths: Paths) -> Result<(), Box<dyn std::error::Error>> {
    paths.ensure_dirs()?;

    let addr = config.bind_addr()?;
    if config.admin_token == DEFAULT_ADMIN_TOKEN {
        warn!("Admin token is the built-in default; set MODWARDEN_ADMIN_TOKEN before exposing this relay");
    }

    let db_path = config.database_file(&paths);
    let db = AsyncDatabase::open(&db_path).await?;
    info!(path = %db_path.display(), "Database ready");

    let state = AppState::new(db.clone(), config.admin_token.clone());
    warden_http::serve(addr, state).await?;

    if let Err(e) = db.close().await {
        warn!(error = %e, "Database close failed");
    }
    info!("Relay stopped");
    Ok(())
}
