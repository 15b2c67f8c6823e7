//! songbook-catalog - song catalog service
//!
//! Serves the song CRUD API on top of a local SQLite database and enriches
//! new songs from the lyrics lookup service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use songbook_catalog::lookup::HttpLyricsLookup;
use songbook_catalog::{build_router, AppState};
use songbook_common::config::{resolve_config, TomlConfig};
use songbook_common::db::init_database;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for songbook-catalog
///
/// Flags override values from the config file.
#[derive(Parser, Debug)]
#[command(name = "songbook-catalog")]
#[command(about = "Song catalog service")]
#[command(version)]
struct Args {
    /// Config file (default: SONGBOOK_CONFIG, then the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "SONGBOOK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SONGBOOK_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "SONGBOOK_DATABASE")]
    database: Option<PathBuf>,

    /// Base URL of the lyrics lookup service
    #[arg(long, env = "SONGBOOK_LOOKUP_URL")]
    lookup_url: Option<String>,

    /// Default log directive (RUST_LOG takes precedence)
    #[arg(long, env = "SONGBOOK_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn apply_overrides(self, mut config: TomlConfig) -> TomlConfig {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(database) = self.database {
            config.database.path = Some(database);
        }
        if let Some(url) = self.lookup_url {
            config.lookup.base_url = url;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        config
    }
}

/// Log level used until the config file has been read
const DEFAULT_LOG_LEVEL: &str = "info";

/// `RUST_LOG` when set, otherwise `level`
fn log_filter(rust_log: Option<&str>, level: &str) -> Result<EnvFilter> {
    let directive = rust_log.unwrap_or(level);
    EnvFilter::try_new(directive).with_context(|| format!("Invalid log directive: {}", directive))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let rust_log = std::env::var("RUST_LOG").ok();

    // Installed before config resolution so its messages are not lost;
    // the configured level is swapped in once the file is read
    let bootstrap = log_filter(
        rust_log.as_deref(),
        args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL),
    )?;
    let (filter, filter_handle) = reload::Layer::new(bootstrap);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = resolve_config(args.config.as_deref()).context("Failed to load configuration")?;
    let config = args.apply_overrides(config);

    if rust_log.is_none() {
        filter_handle
            .reload(log_filter(None, &config.logging.level)?)
            .context("Failed to apply configured log level")?;
    }

    info!(
        "Starting songbook-catalog v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db_path = config.database.resolved_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let lookup = HttpLyricsLookup::new(&config.lookup).context("Failed to build lookup client")?;
    info!("Lyrics lookup: {}", lookup.base_url());

    let state = AppState::with_pool(pool.clone(), Arc::new(lookup));
    let app = build_router(state);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("songbook-catalog listening on http://{}", addr);
    info!("Health check: http://{}/api/health-check", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
