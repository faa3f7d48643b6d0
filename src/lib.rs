//! Process lifecycle engine: ordered startup phases, signal-driven wait and
//! graceful shutdown.

pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::schema::{AppConfig, EngineConfig};
pub use lifecycle::{
    BoxError, Engine, EngineBuilder, EngineError, ExitListener, Phase, Server, Signal,
};
