//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGHUP, SIGQUIT, SIGTERM, SIGINT)
//! - Translate signals to internal events
//! - Let tests inject signals without touching the process
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGQUIT/SIGTERM/SIGINT trigger graceful shutdown
//! - SIGHUP triggers reload hooks, not shutdown

use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;

/// A termination-class notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Hangup,
    Quit,
    Terminate,
    Interrupt,
    /// Anything else a source chooses to forward, by raw number.
    Other(i32),
}

/// What the wait loop does with a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Run the graceful shutdown sequence, then return.
    Shutdown,
    /// Run reload hooks and keep waiting.
    Reload,
    /// Stop waiting without a graceful shutdown.
    Exit,
}

impl Signal {
    pub fn action(self) -> SignalAction {
        match self {
            Signal::Quit | Signal::Terminate | Signal::Interrupt => SignalAction::Shutdown,
            Signal::Hangup => SignalAction::Reload,
            Signal::Other(_) => SignalAction::Exit,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Hangup => write!(f, "SIGHUP"),
            Signal::Quit => write!(f, "SIGQUIT"),
            Signal::Terminate => write!(f, "SIGTERM"),
            Signal::Interrupt => write!(f, "SIGINT"),
            Signal::Other(n) => write!(f, "signal {}", n),
        }
    }
}

/// Source of termination signals the engine waits on.
///
/// `recv` returns `None` once the source can deliver nothing more.
#[async_trait]
pub trait TerminationSource: Send {
    async fn recv(&mut self) -> Option<Signal>;
}

/// Process signals delivered by the operating system.
#[cfg(unix)]
pub struct OsSignals {
    hangup: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    /// Install handlers for the four termination-class signals.
    ///
    /// Once installed, the default action of those signals is replaced for the
    /// rest of the process lifetime.
    pub fn subscribe() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            hangup: signal(SignalKind::hangup())?,
            quit: signal(SignalKind::quit())?,
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }
}

#[cfg(unix)]
#[async_trait]
impl TerminationSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        tokio::select! {
            s = self.hangup.recv() => s.map(|_| Signal::Hangup),
            s = self.quit.recv() => s.map(|_| Signal::Quit),
            s = self.terminate.recv() => s.map(|_| Signal::Terminate),
            s = self.interrupt.recv() => s.map(|_| Signal::Interrupt),
        }
    }
}

/// Process signals delivered by the operating system (Ctrl-C only).
#[cfg(not(unix))]
pub struct OsSignals {
    _priv: (),
}

#[cfg(not(unix))]
impl OsSignals {
    pub fn subscribe() -> std::io::Result<Self> {
        Ok(Self { _priv: () })
    }
}

#[cfg(not(unix))]
#[async_trait]
impl TerminationSource for OsSignals {
    async fn recv(&mut self) -> Option<Signal> {
        tokio::signal::ctrl_c().await.ok().map(|_| Signal::Interrupt)
    }
}

/// Create an in-process signal source and the handle that feeds it.
pub fn channel() -> (SignalSender, ChannelSignals) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SignalSender { tx }, ChannelSignals { rx })
}

/// Sending half of [`channel`].
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<Signal>,
}

impl SignalSender {
    /// Deliver a signal. Returns `false` if the receiving side is gone.
    pub fn send(&self, signal: Signal) -> bool {
        self.tx.send(signal).is_ok()
    }
}

/// Signal source fed by a [`SignalSender`]. Ends when every sender is dropped.
#[derive(Debug)]
pub struct ChannelSignals {
    rx: mpsc::UnboundedReceiver<Signal>,
}

#[async_trait]
impl TerminationSource for ChannelSignals {
    async fn recv(&mut self) -> Option<Signal> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_actions() {
        assert_eq!(Signal::Quit.action(), SignalAction::Shutdown);
        assert_eq!(Signal::Terminate.action(), SignalAction::Shutdown);
        assert_eq!(Signal::Interrupt.action(), SignalAction::Shutdown);
        assert_eq!(Signal::Hangup.action(), SignalAction::Reload);
        assert_eq!(Signal::Other(10).action(), SignalAction::Exit);
    }

    #[test]
    fn test_signal_display() {
        assert_eq!(Signal::Terminate.to_string(), "SIGTERM");
        assert_eq!(Signal::Other(12).to_string(), "signal 12");
    }

    #[tokio::test]
    async fn test_channel_preserves_order() {
        let (tx, mut rx) = channel();
        assert!(tx.send(Signal::Hangup));
        assert!(tx.send(Signal::Terminate));
        drop(tx);

        assert_eq!(rx.recv().await, Some(Signal::Hangup));
        assert_eq!(rx.recv().await, Some(Signal::Terminate));
        assert_eq!(rx.recv().await, None);
    }
}
