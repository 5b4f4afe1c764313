//! # vbasync-sync
//!
//! Reconciliation between a source tree and a document host.
//!
//! [`pipeline::push`] brings the host in line with a directory (or a single
//! changed file), [`pipeline::pull`] exports the host into a directory and
//! [`pipeline::diff`] compares the two without writing.

pub mod apply;
pub mod diff;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod plan;
pub mod pull;

pub use apply::{apply, preview, ActionOutcome, ApplyReport};
pub use diff::ArtifactDiff;
pub use error::SyncError;
pub use index::DirectoryIndex;
pub use pipeline::{PullResult, PushResult, PushScope};
pub use plan::{reconcile, reconcile_one, reconcile_one_removal, SkipReason, SyncAction, SyncPlan};
pub use pull::{ExportOutcome, PullReport};
