//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine and callbacks produce:
//!     → tracing events (phase transitions, signals, stop warnings)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout), installed by the binary
//!     → any Dispatch injected through EngineBuilder::logger
//! ```
//!
//! # Design Decisions
//! - Structured fields, never formatted-in values
//! - Library code never installs a global subscriber

pub mod logging;
