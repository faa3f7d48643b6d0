//! app-engine
//!
//! Runs an [`Engine`] with the process's OS signals.
//!
//! ```text
//!   load config ─▶ init logging ─▶ Engine::run
//!                                    │
//!                                    ├─ load:   report configuration
//!                                    ├─ defer:  heartbeat task (stops on exit signal)
//!                                    ├─ wait:   SIGHUP re-reads the log level
//!                                    └─ stop:   cancel hook, grace period
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use app_engine::config::{load_config, AppConfig};
use app_engine::observability::logging::{init_logging, LogHandle};
use app_engine::{BoxError, Engine, ExitListener};

#[derive(Parser)]
#[command(name = "app-engine")]
#[command(about = "Process lifecycle engine", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,

    /// Heartbeat interval in seconds.
    #[arg(long, default_value_t = 30)]
    heartbeat_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    let log_handle = init_logging(&config.logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "app-engine starting");

    let heartbeat_every = Duration::from_secs(cli.heartbeat_secs.max(1));

    let engine = Engine::builder()
        .config(config.engine.clone())
        .load(move || async move {
            let engine = config.engine;
            tracing::info!(
                grace_period_ms = engine.grace_period_ms,
                stop_order = ?engine.stop_order,
                phase_timeout_ms = ?engine.phase_timeout_ms,
                stop_timeout_ms = ?engine.stop_timeout_ms,
                "Configuration loaded"
            );
            Ok::<_, BoxError>(())
        })
        .defer(move |exit| async move {
            tokio::spawn(heartbeat(exit, heartbeat_every));
            Ok::<_, BoxError>(())
        })
        .cancel(|| async {
            tracing::info!("Running cancel hooks");
        })
        .on_reload({
            let path = cli.config.clone();
            let pinned = cli.log_level.is_some();
            move || {
                let path = path.clone();
                let log_handle = log_handle.clone();
                async move { reload_log_level(path.as_deref(), pinned, &log_handle) }
            }
        })
        .build();

    engine.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Periodic liveness log until the exit signal fires.
async fn heartbeat(exit: ExitListener, every: Duration) {
    let mut ticker = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tracing::debug!("Heartbeat");
            }
            _ = exit.fired() => {
                tracing::info!("Heartbeat received exit signal, stopping");
                break;
            }
        }
    }
}

/// Re-read the config file and apply its log level. Engine settings are fixed
/// for the life of the process and are not re-applied.
fn reload_log_level(path: Option<&Path>, pinned: bool, log_handle: &LogHandle) {
    let Some(path) = path else {
        tracing::info!("SIGHUP received, no config file to reload");
        return;
    };
    if pinned {
        tracing::info!("SIGHUP received, log level pinned by --log-level");
        return;
    }

    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config. Keeping current log level.");
            return;
        }
    };

    match log_handle.set_level(&config.logging.level) {
        Ok(()) => {
            tracing::info!(level = %config.logging.level, path = ?path, "Log level reloaded")
        }
        Err(e) => tracing::error!(error = %e, "Failed to apply log level"),
    }
}
