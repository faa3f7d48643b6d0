//! Exit signal shared between the engine and background work.

use std::sync::Arc;
use tokio::sync::watch;

/// Fire-once broadcast that marks the start of shutdown.
///
/// Only the engine holds this handle. Everything else observes it through an
/// [`ExitListener`], so nothing outside the engine can fire it.
#[derive(Debug)]
pub struct ExitSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ExitSignal {
    /// Create an exit signal in the open state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal, waking every listener.
    ///
    /// Returns `true` if this call performed the transition and `false` if the
    /// signal had already fired. Listeners are woken at most once.
    pub fn fire(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    /// Whether the signal has fired.
    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Create a read-only listener on this signal.
    pub fn listener(&self) -> ExitListener {
        ExitListener {
            tx: Arc::clone(&self.tx),
        }
    }

    /// Number of listeners currently parked in [`ExitListener::fired`].
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ExitSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of an [`ExitSignal`].
#[derive(Debug, Clone)]
pub struct ExitListener {
    tx: Arc<watch::Sender<bool>>,
}

impl ExitListener {
    /// Wait until the signal fires. Returns immediately if it already has.
    pub async fn fired(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|fired| *fired).await;
    }

    /// Whether the signal has fired.
    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }
}
