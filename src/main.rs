//! Task API server.
//!
//! A small CRUD service for users and tasks built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                  TASK API                    │
//!                        │                                              │
//!   Client Request       │  ┌──────────┐    ┌────────────┐              │
//!   ─────────────────────┼─▶│   http   │───▶│  routing   │              │
//!                        │  │  server  │    │ route table│              │
//!                        │  └──────────┘    └─────┬──────┘              │
//!                        │                        │                     │
//!                        │                        ▼                     │
//!   Client Response      │  ┌──────────┐    ┌────────────┐   ┌───────┐  │
//!   ◀────────────────────┼──│ response │◀───│ resources  │──▶│ store │──┼──▶ db.json
//!                        │  │  (JSON)  │    │users/tasks │   │       │  │
//!                        │  └──────────┘    └────────────┘   └───────┘  │
//!                        │                                              │
//!                        │  config · observability · lifecycle          │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use task_api::config::{load_config, validate_config, ApiConfig, ConfigError};
use task_api::observability::{logging, metrics};
use task_api::{ApiServer, Database, Shutdown};

#[derive(Parser)]
#[command(name = "task-api")]
#[command(about = "CRUD API for users and tasks backed by a JSON file", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the data file location.
    #[arg(short, long)]
    data_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ApiConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(data_file) = cli.data_file {
        config.storage.data_file = data_file;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("task-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        data_file = %config.storage.resolved_path().display(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let database = Database::open(config.storage.resolved_path()).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = ApiServer::new(config, database);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
