use std::path::Path;

use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::WatchError;
use crate::event::{file_events, FileEvent};

/// Watch `root` recursively and push every file event into `events`, in the
/// order the backend reports them.
///
/// The callback runs on the backend's own thread and blocks there while the
/// queue is full. Events stop when the returned watcher is dropped.
pub fn watch_tree(
    root: &Path,
    events: mpsc::Sender<FileEvent>,
) -> Result<RecommendedWatcher, WatchError> {
    let mut watcher = recommended_watcher(move |result: notify::Result<Event>| {
        let event = match result {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "watcher event error");
                return;
            }
        };
        for file_event in file_events(&event) {
            tracing::debug!(
                kind = ?file_event.kind,
                path = %file_event.path.display(),
                "file event"
            );
            if events.blocking_send(file_event).is_err() {
                tracing::debug!("dispatcher gone, dropping file event");
                return;
            }
        }
    })?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    tracing::info!(root = %root.display(), "watching for changes");
    Ok(watcher)
}
