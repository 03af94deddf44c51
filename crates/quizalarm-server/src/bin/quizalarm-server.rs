//! quizalarm-server - sync backend for quizalarm devices
//!
//! Serves the balance/history intake and remote configuration endpoints
//! over a SQLite database.

use anyhow::{Context, Result};
use clap::Parser;
use quizalarm_api::DEFAULT_TND_RATE;
use quizalarm_server::{AppState, Repository, create_router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quizalarm-server")]
#[command(about = "Sync backend for quizalarm devices", long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// SQLite database path
    #[arg(long, env = "DB_PATH", default_value = "./data/quizalarm.db")]
    db_path: PathBuf,

    /// Conversion rate stored on first start
    #[arg(long, env = "DEFAULT_TND_RATE", default_value_t = DEFAULT_TND_RATE)]
    default_tnd_rate: f64,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "quizalarm-server starting");

    let repository = Repository::open(&args.db_path, args.default_tnd_rate)
        .with_context(|| format!("Failed to open database at {:?}", args.db_path))?;
    info!(path = %args.db_path.display(), "Database ready");

    let app = create_router(AppState::new(Arc::new(repository)));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}
