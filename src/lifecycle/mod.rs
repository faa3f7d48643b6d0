//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs, engine.rs):
//!     Load functions → Defer functions → Start servers
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT/SIGQUIT → Trigger graceful shutdown
//!     SIGHUP → Run reload hooks
//!
//! Shutdown (engine.rs, shutdown.rs):
//!     Stop servers → Cancel functions → Fire exit signal → Grace period
//! ```
//!
//! # Design Decisions
//! - Ordered startup, fail fast, no rollback of started servers
//! - Servers stop in registration order unless configured otherwise
//! - The exit signal fires exactly once; callbacks only get a listener

pub mod engine;
pub mod server;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use engine::{Engine, EngineBuilder};
pub use server::{BoxError, Server};
pub use shutdown::{ExitListener, ExitSignal};
pub use signals::{OsSignals, Signal, SignalAction, TerminationSource};
pub use startup::{EngineError, Phase};
