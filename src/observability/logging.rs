//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Build a scoped subscriber for a single engine
//! - Swap the active filter at runtime (SIGHUP reload)
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level at startup
//! - Only the filter is reloadable; the output format is fixed once installed

use thiserror::Error;
use tracing::Dispatch;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt};
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};

/// Error type for filter reloads.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("subscriber gone: {0}")]
    Subscriber(#[from] reload::Error),
}

/// Handle to the filter of a subscriber built by this module.
#[derive(Clone)]
pub struct LogHandle {
    inner: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Replace the active filter with `level` (e.g. "debug", "app_engine=trace").
    pub fn set_level(&self, level: &str) -> Result<(), ReloadError> {
        let filter = EnvFilter::try_new(level)?;
        self.inner.reload(filter)?;
        Ok(())
    }
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| config.level.as_str().into())
}

/// Install the process-wide subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<LogHandle, TryInitError> {
    let (filter, handle) = reload::Layer::new(env_filter(config));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Full => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()?,
    }

    Ok(LogHandle { inner: handle })
}

/// Build a subscriber for [`crate::EngineBuilder::logger`] without touching the
/// global default.
pub fn dispatch(config: &LoggingConfig) -> (Dispatch, LogHandle) {
    let (filter, handle) = reload::Layer::new(env_filter(config));
    let registry = tracing_subscriber::registry().with(filter);

    let dispatch = match config.format {
        LogFormat::Full => Dispatch::new(registry.with(tracing_subscriber::fmt::layer())),
        LogFormat::Compact => {
            Dispatch::new(registry.with(tracing_subscriber::fmt::layer().compact()))
        }
    };

    (dispatch, LogHandle { inner: handle })
}
