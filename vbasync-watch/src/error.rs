use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the watcher and its dispatcher.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("host error: {0}")]
    Host(#[from] vbasync_core::HostError),

    #[error("sync error: {0}")]
    Sync(#[from] vbasync_sync::SyncError),

    #[error("reconciliation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> WatchError {
    WatchError::Io {
        path: path.into(),
        source,
    }
}
