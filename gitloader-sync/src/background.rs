//! Background dispatch of sync and clone runs.
//!
//! Requests are validated on the caller's thread; only a valid request gets a
//! background unit. The unit runs on tokio's blocking pool because every step
//! waits on a child process. Status events flow back over a channel that
//! only the foreground drains.
//!
//! Must be called from within a tokio runtime.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use gitloader_core::{
    CloneOutcome, CloneRequest, FailureKind, RequestError, StatusEvent, SyncOutcome, SyncRequest,
};

use crate::pipeline::Engine;
use crate::reporter::ChannelReporter;

/// A running sync: its status stream and its eventual outcome.
#[derive(Debug)]
pub struct SyncHandle {
    events: mpsc::UnboundedReceiver<StatusEvent>,
    task: JoinHandle<SyncOutcome>,
}

impl SyncHandle {
    /// Next status event, or `None` once the run has stopped reporting.
    pub async fn next_event(&mut self) -> Option<StatusEvent> {
        self.events.recv().await
    }

    /// Wait for the terminal outcome. Remaining events are discarded.
    pub async fn outcome(self) -> SyncOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => unexpected_sync(err),
        }
    }

    /// Feed every event to `on_event` in emission order, then return the
    /// outcome.
    pub async fn run_to_completion<F>(mut self, mut on_event: F) -> SyncOutcome
    where
        F: FnMut(&StatusEvent),
    {
        while let Some(event) = self.next_event().await {
            on_event(&event);
        }
        self.outcome().await
    }
}

/// Validate `request` and start it in the background.
///
/// Returns immediately. A validation error is returned here and no run is
/// started.
pub fn spawn_sync(engine: Arc<Engine>, request: SyncRequest) -> Result<SyncHandle, RequestError> {
    request.validate()?;
    let (reporter, events) = ChannelReporter::channel();
    let task = tokio::task::spawn_blocking(move || engine.sync(&request, &reporter));
    Ok(SyncHandle { events, task })
}

/// A running clone.
#[derive(Debug)]
pub struct CloneHandle {
    task: JoinHandle<CloneOutcome>,
}

impl CloneHandle {
    pub async fn outcome(self) -> CloneOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => CloneOutcome::Failed {
                detail: join_detail("clone", &err),
            },
        }
    }
}

/// Validate `request` and start the clone in the background.
pub fn spawn_clone(
    engine: Arc<Engine>,
    request: CloneRequest,
) -> Result<CloneHandle, RequestError> {
    request.validate()?;
    let task = tokio::task::spawn_blocking(move || engine.clone_repository(&request));
    Ok(CloneHandle { task })
}

fn unexpected_sync(err: JoinError) -> SyncOutcome {
    let detail = join_detail("sync", &err);
    tracing::error!(%detail, "sync task did not complete");
    SyncOutcome::Failed {
        kind: FailureKind::Unexpected,
        detail,
    }
}

fn join_detail(what: &str, err: &JoinError) -> String {
    if err.is_panic() {
        format!("{what} task panicked")
    } else {
        format!("{what} task was cancelled: {err}")
    }
}
