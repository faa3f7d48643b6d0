//! Startup orchestration.
//!
//! # Responsibilities
//! - Name the phases the engine moves through
//! - Define the callback shapes registered on the engine
//! - Report startup failures
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Phases run in order, never concurrently
//! - Servers start last (traffic only when ready)

use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::lifecycle::server::BoxError;
use crate::lifecycle::shutdown::ExitListener;

pub(crate) type LoadFn = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), BoxError>> + Send>;
pub(crate) type DeferFn =
    Box<dyn FnOnce(ExitListener) -> BoxFuture<'static, Result<(), BoxError>> + Send>;
pub(crate) type CancelFn = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;
pub(crate) type ReloadFn = Box<dyn FnMut() -> BoxFuture<'static, ()> + Send>;

/// Lifecycle state of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configured,
    Loading,
    DeferPhase,
    Starting,
    Waiting,
    Stopping,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Configured => "configured",
            Phase::Loading => "loading",
            Phase::DeferPhase => "defer",
            Phase::Starting => "starting",
            Phase::Waiting => "waiting",
            Phase::Stopping => "stopping",
            Phase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Errors returned by the engine.
///
/// Startup variants carry the failing callback's own error unchanged as
/// `source`; [`EngineError::into_source`] hands it back for downcasting.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A load function failed.
    #[error("load function #{index} failed: {source}")]
    Load {
        index: usize,
        #[source]
        source: BoxError,
    },

    /// A defer function failed.
    #[error("defer function #{index} failed: {source}")]
    Defer {
        index: usize,
        #[source]
        source: BoxError,
    },

    /// A server failed to start. Servers started before it keep running.
    #[error("server {server} (#{index}) failed to start: {source}")]
    Start {
        index: usize,
        server: String,
        #[source]
        source: BoxError,
    },

    /// A startup step exceeded the configured phase timeout.
    #[error("{phase} step #{index} timed out after {after:?}")]
    Timeout {
        phase: Phase,
        index: usize,
        after: Duration,
    },

    /// A server factory failed during configuration.
    #[error("server construction failed: {source}")]
    Construct {
        #[source]
        source: BoxError,
    },

    /// Subscribing to OS signals failed.
    #[error("signal subscription failed: {0}")]
    Signals(#[from] std::io::Error),
}

impl EngineError {
    /// The phase the error was raised in.
    pub fn phase(&self) -> Phase {
        match self {
            EngineError::Load { .. } => Phase::Loading,
            EngineError::Defer { .. } => Phase::DeferPhase,
            EngineError::Start { .. } => Phase::Starting,
            EngineError::Timeout { phase, .. } => *phase,
            EngineError::Construct { .. } => Phase::Configured,
            EngineError::Signals(_) => Phase::Waiting,
        }
    }

    /// Recover the error returned by the failing callback, if there was one.
    pub fn into_source(self) -> Option<BoxError> {
        match self {
            EngineError::Load { source, .. }
            | EngineError::Defer { source, .. }
            | EngineError::Start { source, .. }
            | EngineError::Construct { source } => Some(source),
            EngineError::Signals(e) => Some(Box::new(e)),
            EngineError::Timeout { .. } => None,
        }
    }
}

/// Await one startup step, bounded by `limit` when set.
///
/// `wrap` turns the step's own error into the phase-specific variant.
pub(crate) async fn run_step<F>(
    phase: Phase,
    index: usize,
    limit: Option<Duration>,
    step: F,
    wrap: impl FnOnce(BoxError) -> EngineError,
) -> Result<(), EngineError>
where
    F: Future<Output = Result<(), BoxError>>,
{
    let res = match limit {
        Some(after) => tokio::time::timeout(after, step)
            .await
            .map_err(|_| EngineError::Timeout { phase, index, after })?,
        None => step.await,
    };
    res.map_err(wrap)
}
