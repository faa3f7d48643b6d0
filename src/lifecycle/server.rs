//! Server capability driven by the engine.

use async_trait::async_trait;
use std::sync::Arc;

/// Error type returned by callbacks and servers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A long-running component with explicit start and graceful stop.
///
/// The engine calls `start` once during startup and `graceful_stop` once
/// during shutdown. It never inspects the server beyond that.
#[async_trait]
pub trait Server
where
    Self: Send + Sync + 'static,
{
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Start the server. Should return once it is accepting work.
    async fn start(&self) -> Result<(), BoxError>;

    /// Stop the server, letting in-flight work finish.
    async fn graceful_stop(&self);
}

#[async_trait]
impl<T> Server for Arc<T>
where
    T: Server + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn start(&self) -> Result<(), BoxError> {
        (**self).start().await
    }

    async fn graceful_stop(&self) {
        (**self).graceful_stop().await
    }
}
