//! lanshare: share a directory over the local network.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────┐
//!                       │                  LANSHARE                    │
//!                       │                                              │
//!   Browser request     │  ┌─────────┐   ┌─────────┐   ┌───────────┐   │
//!   ────────────────────┼─▶│   net   │──▶│  http   │──▶│  routing  │   │
//!                       │  │listener │   │ server  │   │   Route   │   │
//!                       │  └─────────┘   └─────────┘   └─────┬─────┘   │
//!                       │                                    │         │
//!                       │             ┌──────────────────────┼───────┐ │
//!                       │             ▼                      ▼       ▼ │
//!                       │      ┌────────────┐  ┌──────────┐ ┌───────┐  │
//!                       │      │  listing   │  │ resolver │ │multi- │  │
//!                       │      │  + page    │  │+transfer │ │ part  │  │
//!                       │      └────────────┘  └────┬─────┘ └───┬───┘  │
//!                       │                           ▼           ▼      │
//!                       │                      shared root / upload dir│
//!                       │                                              │
//!                       │  config · observability · lifecycle          │
//!                       └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use lanshare::config::{load_config, validate_config, ConfigError, ShareConfig};
use lanshare::http::HttpServer;
use lanshare::lifecycle::{signals, startup, Shutdown};
use lanshare::net;
use lanshare::observability::{logging, metrics};

/// Share a directory over the local network.
#[derive(Debug, Parser)]
#[command(name = "lanshare", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to share.
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Directory uploads are written to (defaults to the shared directory).
    #[arg(short, long)]
    upload_dir: Option<PathBuf>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface address to bind.
    #[arg(long)]
    host: Option<std::net::IpAddr>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Load the file (or defaults) and apply command line overrides.
    fn into_config(self) -> Result<ShareConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ShareConfig::default(),
        };

        if let Some(dir) = self.dir {
            config.storage.root_dir = dir;
        }
        if let Some(upload_dir) = self.upload_dir {
            config.storage.upload_dir = Some(upload_dir);
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "lanshare starting");

    tracing::info!(
        root_dir = %config.storage.root_dir.display(),
        upload_dir = %config.storage.upload_dir().display(),
        bind_address = %config.listener.bind_address(),
        chunk_size = config.transfer.chunk_size,
        "Configuration loaded"
    );

    startup::prepare_storage(&config.storage)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = net::bind(&config.listener).await?;
    let local_addr = listener.local_addr()?;

    let server = HttpServer::new(config)?;
    startup::announce(local_addr);

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
