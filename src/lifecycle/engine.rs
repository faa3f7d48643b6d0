//! The lifecycle engine.
//!
//! Runs registered callbacks through the startup phases, waits for a
//! terminating signal, then drives the shutdown sequence.

use futures_util::{FutureExt, TryFutureExt};
use std::future::Future;
use std::time::Duration;
use tracing::instrument::WithSubscriber;
use tracing::Dispatch;

use crate::config::{EngineConfig, StopOrder};
use crate::lifecycle::server::{BoxError, Server};
use crate::lifecycle::shutdown::{ExitListener, ExitSignal};
use crate::lifecycle::signals::{OsSignals, SignalAction, TerminationSource};
use crate::lifecycle::startup::{
    run_step, CancelFn, DeferFn, EngineError, LoadFn, Phase, ReloadFn,
};

/// Collects callbacks and servers before an [`Engine`] is built.
///
/// Every registration appends; nothing is ever replaced or removed.
pub struct EngineBuilder {
    config: EngineConfig,
    logger: Option<Dispatch>,
    loads: Vec<LoadFn>,
    defers: Vec<DeferFn>,
    servers: Vec<Box<dyn Server>>,
    cancels: Vec<CancelFn>,
    reloads: Vec<ReloadFn>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            logger: None,
            loads: Vec::new(),
            defers: Vec::new(),
            servers: Vec::new(),
            cancels: Vec::new(),
            reloads: Vec::new(),
        }
    }

    /// Replace the engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the pause taken after the exit signal fires.
    pub fn grace_period(mut self, period: Duration) -> Self {
        self.config.grace_period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Route engine diagnostics, and the callbacks it drives, to `logger`
    /// instead of the global subscriber.
    pub fn logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    /// Append a load function. Load functions run first; any failure aborts
    /// startup.
    pub fn load<F, Fut, E>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        self.loads
            .push(Box::new(move || f().map_err(Into::<BoxError>::into).boxed()));
        self
    }

    /// Append a defer function. Defer functions run after every load function
    /// succeeded and receive a listener on the exit signal. They should spawn
    /// their background work and return promptly.
    pub fn defer<F, Fut, E>(mut self, f: F) -> Self
    where
        F: FnOnce(ExitListener) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        self.defers.push(Box::new(move |exit: ExitListener| {
            f(exit).map_err(Into::<BoxError>::into).boxed()
        }));
        self
    }

    /// Append a server.
    pub fn server<S: Server>(mut self, server: S) -> Self {
        self.servers.push(Box::new(server));
        self
    }

    /// Construct a server and append it. Nothing is appended if `factory`
    /// fails.
    pub fn try_server<S, E, F>(self, factory: F) -> Result<Self, EngineError>
    where
        S: Server,
        E: Into<BoxError>,
        F: FnOnce() -> Result<S, E>,
    {
        match factory() {
            Ok(server) => Ok(self.server(server)),
            Err(e) => Err(EngineError::Construct { source: e.into() }),
        }
    }

    /// Append a cancel function, run during shutdown after servers stop.
    pub fn cancel<F, Fut>(mut self, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancels.push(Box::new(move || f().boxed()));
        self
    }

    /// Append a hook run on every SIGHUP.
    pub fn on_reload<F, Fut>(mut self, mut f: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.reloads.push(Box::new(move || f().boxed()));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            config: self.config,
            logger: self.logger,
            loads: self.loads,
            defers: self.defers,
            servers: self.servers,
            cancels: self.cancels,
            reloads: self.reloads,
            exit: ExitSignal::new(),
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Process lifecycle engine.
///
/// Startup runs load functions, then defer functions, then starts servers,
/// each in registration order and failing fast. The engine then waits for a
/// terminating signal and shuts down: servers stop, cancel functions run,
/// the exit signal fires, and the grace period elapses.
///
/// `run` consumes the engine, so shutdown happens at most once.
pub struct Engine {
    config: EngineConfig,
    logger: Option<Dispatch>,
    loads: Vec<LoadFn>,
    defers: Vec<DeferFn>,
    servers: Vec<Box<dyn Server>>,
    cancels: Vec<CancelFn>,
    reloads: Vec<ReloadFn>,
    exit: ExitSignal,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// An engine with nothing registered and default configuration.
    pub fn new() -> Self {
        EngineBuilder::new().build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A listener on this engine's exit signal, usable from outside `run`.
    pub fn listener(&self) -> ExitListener {
        self.exit.listener()
    }

    /// Run the engine against the process's OS signals.
    ///
    /// Signal handlers are installed only after every server started.
    pub async fn run(self) -> Result<(), EngineError> {
        self.run_inner(|| Ok(OsSignals::subscribe()?)).await
    }

    /// Run the engine against an injected signal source.
    pub async fn run_with<S: TerminationSource>(self, source: S) -> Result<(), EngineError> {
        self.run_inner(move || Ok(source)).await
    }

    async fn run_inner<S, F>(mut self, subscribe: F) -> Result<(), EngineError>
    where
        S: TerminationSource,
        F: FnOnce() -> Result<S, EngineError> + Send,
    {
        match self.logger.take() {
            Some(logger) => self.drive(subscribe).with_subscriber(logger).await,
            None => self.drive(subscribe).await,
        }
    }

    async fn drive<S, F>(self, subscribe: F) -> Result<(), EngineError>
    where
        S: TerminationSource,
        F: FnOnce() -> Result<S, EngineError> + Send,
    {
        let Engine {
            config,
            loads,
            defers,
            servers,
            cancels,
            mut reloads,
            exit,
            ..
        } = self;
        let limit = config.phase_timeout();

        tracing::debug!(phase = %Phase::Loading, count = loads.len(), "Entering phase");
        for (index, load) in loads.into_iter().enumerate() {
            run_step(Phase::Loading, index, limit, load(), |source| {
                EngineError::Load { index, source }
            })
            .await?;
        }

        tracing::debug!(phase = %Phase::DeferPhase, count = defers.len(), "Entering phase");
        for (index, defer) in defers.into_iter().enumerate() {
            run_step(Phase::DeferPhase, index, limit, defer(exit.listener()), |source| {
                EngineError::Defer { index, source }
            })
            .await?;
        }

        tracing::debug!(phase = %Phase::Starting, count = servers.len(), "Entering phase");
        for (index, server) in servers.iter().enumerate() {
            run_step(Phase::Starting, index, limit, server.start(), |source| {
                EngineError::Start {
                    index,
                    server: server.name().to_string(),
                    source,
                }
            })
            .await?;
            tracing::debug!(server = server.name(), "Server started");
        }

        tracing::debug!("Application run success");

        let mut source = subscribe()?;
        tracing::debug!(phase = %Phase::Waiting, "Waiting for termination signal");

        while let Some(signal) = source.recv().await {
            tracing::debug!(signal = %signal, "Signal received");

            match signal.action() {
                SignalAction::Shutdown => {
                    stop(&config, &servers, cancels, &exit).await;
                    return Ok(());
                }
                SignalAction::Reload => {
                    for reload in reloads.iter_mut() {
                        reload().await;
                    }
                }
                SignalAction::Exit => {
                    tracing::warn!(signal = %signal, "Unexpected signal, exiting without shutdown");
                    return Ok(());
                }
            }
        }

        tracing::warn!("Signal source closed, exiting without shutdown");
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Graceful shutdown: stop servers, run cancel functions, fire the exit
/// signal, then wait out the grace period. Nothing here can fail.
async fn stop(
    config: &EngineConfig,
    servers: &[Box<dyn Server>],
    cancels: Vec<CancelFn>,
    exit: &ExitSignal,
) {
    tracing::debug!(phase = %Phase::Stopping, count = servers.len(), "Entering phase");

    let ordered: Vec<&dyn Server> = match config.stop_order {
        StopOrder::Registration => servers.iter().map(AsRef::as_ref).collect(),
        StopOrder::Reverse => servers.iter().rev().map(AsRef::as_ref).collect(),
    };

    for server in ordered {
        match config.stop_timeout() {
            Some(after) => {
                if tokio::time::timeout(after, server.graceful_stop())
                    .await
                    .is_err()
                {
                    tracing::warn!(
                        server = server.name(),
                        timeout = ?after,
                        "Graceful stop timed out, continuing shutdown"
                    );
                }
            }
            None => server.graceful_stop().await,
        }
        tracing::debug!(server = server.name(), "Server stopped");
    }

    for cancel in cancels {
        cancel().await;
    }

    exit.fire();

    let grace = config.grace_period();
    tracing::debug!(grace_period = ?grace, "Exit signal fired, waiting for background work");
    tokio::time::sleep(grace).await;

    tracing::debug!(phase = %Phase::Stopped, "Shutdown complete");
}
