//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Lifecycle engine settings.
    pub engine: EngineConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Order in which servers are stopped during shutdown.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StopOrder {
    /// Same order the servers were registered (and started) in.
    #[default]
    Registration,
    /// Last registered server stops first.
    Reverse,
}

/// Lifecycle engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Pause after firing the exit signal, in milliseconds.
    pub grace_period_ms: u64,

    /// Server stop order.
    pub stop_order: StopOrder,

    /// Bound on each load, defer and start call. None waits forever.
    pub phase_timeout_ms: Option<u64>,

    /// Bound on each server's graceful stop. None waits forever.
    pub stop_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 2000,
            stop_order: StopOrder::Registration,
            phase_timeout_ms: None,
            stop_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }

    pub fn phase_timeout(&self) -> Option<Duration> {
        self.phase_timeout_ms.map(Duration::from_millis)
    }

    pub fn stop_timeout(&self) -> Option<Duration> {
        self.stop_timeout_ms.map(Duration::from_millis)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (e.g. "info", "app_engine=debug").
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Full,
        }
    }
}
