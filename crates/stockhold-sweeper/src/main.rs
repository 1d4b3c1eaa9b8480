//! # Stockhold Expiry Sweeper
//!
//! Long-running process that expires lapsed reservations.
//!
//! ## Usage
//! ```bash
//! stockhold-sweeper                          # platform config file, if any
//! stockhold-sweeper --config ./sweeper.toml
//! RUST_LOG=debug STOCKHOLD_SWEEP_INTERVAL_SECS=10 stockhold-sweeper
//! ```
//!
//! ## Lifecycle
//! ```text
//! load config ─► init tracing ─► open database (migrations)
//!      ─► spawn sweeper ─► wait for Ctrl+C / SIGTERM ─► stop sweeper ─► close pool
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stockhold_core::SystemClock;
use stockhold_db::{Database, ReservationManager};
use stockhold_sweeper::{ExpirySweeper, SweeperConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = SweeperConfig::load(config_path_arg())?;
    info!(
        db_path = %config.database.path.display(),
        interval_secs = config.sweep.interval_secs,
        enabled = config.sweep.enabled,
        "Configuration loaded"
    );

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(config.db_config()).await?;
    let manager = Arc::new(ReservationManager::new(
        db.clone(),
        Arc::new(SystemClock),
        config.reservation,
    ));

    if !config.sweep.enabled {
        warn!("Sweeping disabled by configuration; waiting for shutdown");
        shutdown_signal().await;
        db.close().await;
        return Ok(());
    }

    let (sweeper, handle) = ExpirySweeper::new(manager, config.sweep.interval());
    let task = tokio::spawn(sweeper.run());

    shutdown_signal().await;

    handle.shutdown().await?;
    let stats = task.await?;
    info!(
        runs = stats.runs,
        expired = stats.expired,
        failures = stats.failures,
        "Sweeper stopped"
    );

    db.close().await;
    info!("Shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show per-sweep and query detail
/// - Default: INFO for stockhold crates, WARN for sqlx
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// `--config <path>` / `-c <path>`, if given.
fn config_path_arg() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--config" || a == "-c")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
