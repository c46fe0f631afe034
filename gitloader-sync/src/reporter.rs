//! Status reporting from a running operation to whoever presents it.
//!
//! The background unit only ever *sends*; the foreground owns presentation
//! state and drains the channel on its own loop. Delivery is FIFO, so events
//! arrive in the order they were produced.

use std::sync::Mutex;

use tokio::sync::mpsc;

use gitloader_core::{Severity, StatusEvent};

/// Receives progress notifications. Reporting never fails the operation.
pub trait StatusReporter: Send + Sync {
    fn report(&self, event: StatusEvent);
}

impl<F> StatusReporter for F
where
    F: Fn(StatusEvent) + Send + Sync,
{
    fn report(&self, event: StatusEvent) {
        self(event)
    }
}

/// Forwards events to the foreground over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<StatusEvent>,
}

impl ChannelReporter {
    pub fn new(tx: mpsc::UnboundedSender<StatusEvent>) -> Self {
        Self { tx }
    }

    /// A reporter and the receiving end the foreground should drain.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StatusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl StatusReporter for ChannelReporter {
    fn report(&self, event: StatusEvent) {
        log_event(&event);
        // A foreground that stopped listening does not stop the run.
        let _ = self.tx.send(event);
    }
}

/// Discards events (still logs them).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl StatusReporter for NullReporter {
    fn report(&self, event: StatusEvent) {
        log_event(&event);
    }
}

/// Keeps every event in memory; handy for blocking callers and tests.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<StatusEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl StatusReporter for MemoryReporter {
    fn report(&self, event: StatusEvent) {
        log_event(&event);
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

fn log_event(event: &StatusEvent) {
    match event.severity {
        Severity::Error => tracing::error!(phase = ?event.phase, "{}", event.message),
        _ => tracing::info!(phase = ?event.phase, "{}", event.message),
    }
}
