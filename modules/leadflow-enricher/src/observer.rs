//! Sinks for [`RunEvent`]s.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::events::RunEvent;

/// Receives every event the orchestrator emits, in order.
///
/// Called synchronously from the batch loop, so implementations must not block.
/// Also implemented for `Arc<O>` so an observer can be shared for assertions.
pub trait RunObserver: Send + Sync {
    fn observe(&self, event: &RunEvent);
}

impl<O: RunObserver + ?Sized> RunObserver for Arc<O> {
    fn observe(&self, event: &RunEvent) {
        (**self).observe(event)
    }
}

/// Fan-out to several observers.
impl RunObserver for Vec<Box<dyn RunObserver>> {
    fn observe(&self, event: &RunEvent) {
        for observer in self {
            observer.observe(event);
        }
    }
}

// ---------------------------------------------------------------------------
// TracingObserver: human-readable log lines
// ---------------------------------------------------------------------------

pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn observe(&self, event: &RunEvent) {
        let kind = event.event_type();
        match event {
            RunEvent::BatchFailed { index, error } => {
                warn!(event = kind, batch = index, error = %error, "{event}");
            }
            RunEvent::RunFailed { error } => {
                error!(event = kind, error = %error, "{event}");
            }
            RunEvent::RunCompleted { stats } | RunEvent::RunPaused { stats, .. } => {
                info!(
                    event = kind,
                    processed = stats.processed,
                    successful = stats.successful,
                    failed = stats.failed,
                    api_calls = stats.api_calls,
                    "{event}"
                );
            }
            _ => info!(event = kind, "{event}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelObserver: forwards events to a UI task
// ---------------------------------------------------------------------------

pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiver it feeds.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RunObserver for ChannelObserver {
    fn observe(&self, event: &RunEvent) {
        // A dropped receiver just means nobody is watching any more.
        let _ = self.tx.send(event.clone());
    }
}

// ---------------------------------------------------------------------------
// MemoryObserver (tests)
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryObserver {
    events: Mutex<Vec<RunEvent>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Just the `event_type` strings, for order assertions.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(RunEvent::event_type)
            .collect()
    }
}

impl RunObserver for MemoryObserver {
    fn observe(&self, event: &RunEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
