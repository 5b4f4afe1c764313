//! Error types for vbasync-sync.

use std::path::PathBuf;

use thiserror::Error;

use vbasync_core::{HostError, TextError};

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The host failed before any change was applied.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// The host became unreachable after some actions were already applied.
    /// Applied actions stay applied.
    #[error("host failed after {applied} of {total} actions were applied: {source}")]
    PartiallyApplied {
        applied: usize,
        total: usize,
        #[source]
        source: HostError,
    },

    /// A single source file could not be read or decoded.
    #[error(transparent)]
    Text(#[from] TextError),

    /// A path has no file stem to derive an artifact name from.
    #[error("cannot derive an artifact name from {path}")]
    UnnamedPath { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Whether the failure came from losing the host.
    pub fn is_host_failure(&self) -> bool {
        match self {
            SyncError::Host(err) => err.is_fatal(),
            SyncError::PartiallyApplied { .. } => true,
            _ => false,
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
