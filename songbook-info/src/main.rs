//! songbook-info - stand-in lyrics lookup service

use anyhow::{Context, Result};
use clap::Parser;
use songbook_info::{build_router, shutdown_on, DEFAULT_PORT};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songbook-info
#[derive(Parser, Debug)]
#[command(name = "songbook-info")]
#[command(about = "Stand-in lyrics lookup service")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1", env = "SONGBOOK_INFO_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "SONGBOOK_INFO_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "songbook_info=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    info!("Starting songbook-info v{}", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("songbook-info listening on http://{}", addr);

    axum::serve(listener, build_router())
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await
        .context("Server error")?;

    Ok(())
}
