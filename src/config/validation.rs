//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Check the log filter parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be greater than zero when set")]
    ZeroTimeout { field: &'static str },

    #[error("invalid log level {level:?}: {reason}")]
    LogLevel { level: String, reason: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.engine.phase_timeout_ms == Some(0) {
        errors.push(ValidationError::ZeroTimeout {
            field: "engine.phase_timeout_ms",
        });
    }
    if config.engine.stop_timeout_ms == Some(0) {
        errors.push(ValidationError::ZeroTimeout {
            field: "engine.stop_timeout_ms",
        });
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.level) {
        errors.push(ValidationError::LogLevel {
            level: config.logging.level.clone(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
