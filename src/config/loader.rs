//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_config(
            r#"
            [engine]
            grace_period_ms = 250

            [logging]
            level = "debug"
            format = "compact"
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.engine.grace_period_ms, 250);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/app-engine.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let file = write_config("[engine]\ngrace_period_ms = \"soon\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error() {
        let file = write_config("[engine]\nstop_timeout_ms = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Validation failed: "));
    }
}
