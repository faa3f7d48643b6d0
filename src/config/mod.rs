//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → EngineConfig handed to the engine builder
//!
//! On SIGHUP (binary only):
//!     reload hook → loader.rs → validation.rs
//!     → atomic swap of Arc<AppConfig>
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Durations are plain millisecond integers in the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::EngineConfig;
pub use schema::LogFormat;
pub use schema::LoggingConfig;
pub use schema::StopOrder;
