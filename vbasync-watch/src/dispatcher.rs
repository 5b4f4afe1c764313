//! Sequential event dispatcher.
//!
//! One consumer drains the event queue. Each event becomes one single-file
//! push on the blocking pool, and the next event is not taken until that push
//! has returned, so at most one reconciliation touches the host at any time.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use vbasync_core::{HostConnector, SessionClose};
use vbasync_sync::{pipeline, ActionOutcome, PushResult};

use crate::error::WatchError;
use crate::event::FileEvent;

/// Totals for one dispatcher run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Events whose push completed.
    pub processed: usize,
    /// Events whose push failed as a whole.
    pub failed: usize,
    /// Completed events that changed nothing in the host.
    pub unchanged: usize,
}

pub struct Dispatcher<C> {
    connector: Arc<C>,
    document: PathBuf,
}

impl<C> Dispatcher<C>
where
    C: HostConnector + 'static,
{
    pub fn new(connector: Arc<C>, document: impl Into<PathBuf>) -> Self {
        Self {
            connector,
            document: document.into(),
        }
    }

    /// Reconcile one event against a fresh session and artifact list.
    pub async fn dispatch(&self, event: FileEvent) -> Result<PushResult, WatchError> {
        let connector = Arc::clone(&self.connector);
        let document = self.document.clone();
        let scope = event.scope();
        let result = tokio::task::spawn_blocking(move || {
            pipeline::push(connector.as_ref(), &document, scope, false)
        })
        .await??;
        Ok(result)
    }

    /// Drain `events` in arrival order until the queue closes or `shutdown`
    /// fires. A signal received mid-push takes effect once that push returns.
    pub async fn run(
        &self,
        mut events: mpsc::Receiver<FileEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                next = events.recv() => match next {
                    Some(event) => event,
                    None => break,
                },
            };

            let path = event.path.display().to_string();
            let kind = event.kind;
            match self.dispatch(event).await {
                Ok(result) => {
                    summary.processed += 1;
                    if !result.report.has_changes() {
                        summary.unchanged += 1;
                    }
                    log_result(&path, &result);
                }
                Err(err) => {
                    summary.failed += 1;
                    tracing::error!(
                        path = %path,
                        kind = ?kind,
                        error = %err,
                        "reconciliation failed"
                    );
                }
            }
        }
        tracing::info!(
            processed = summary.processed,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "dispatcher stopped"
        );
        summary
    }
}

fn log_result(path: &str, result: &PushResult) {
    for outcome in &result.report.outcomes {
        match outcome {
            ActionOutcome::Failed { .. } => tracing::warn!(path = %path, "{outcome}"),
            _ => tracing::info!(path = %path, "{outcome}"),
        }
    }
    if result.session == SessionClose::LeftOpen && result.report.has_changes() {
        tracing::info!("document is open elsewhere; save it there to keep the changes");
    }
}
