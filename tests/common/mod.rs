//! Shared utilities for lifecycle integration tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use app_engine::{BoxError, Server};

/// Ordered record of everything the engine drove.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn record(log: &EventLog, event: impl Into<String>) {
    log.lock().unwrap().push(event.into());
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// How a mock server behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Behavior {
    Ok,
    FailStart,
    HangOnStop,
}

/// Server that logs `start:<name>` and `stop:<name>`.
pub struct RecordingServer {
    name: String,
    log: EventLog,
    behavior: Behavior,
    stops: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingServer {
    pub fn new(name: &str, log: &EventLog) -> Arc<Self> {
        Self::with_behavior(name, log, Behavior::Ok)
    }

    pub fn with_behavior(name: &str, log: &EventLog, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            behavior,
            stops: AtomicUsize::new(0),
        })
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Server for RecordingServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), BoxError> {
        record(&self.log, format!("start:{}", self.name));
        if self.behavior == Behavior::FailStart {
            return Err(format!("{} refused to start", self.name).into());
        }
        Ok(())
    }

    async fn graceful_stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        record(&self.log, format!("stop:{}", self.name));
        if self.behavior == Behavior::HangOnStop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }
}
