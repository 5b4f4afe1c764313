//! Shared entry points used by the CLI and the watcher.
//!
//! Each call opens its own session through a [`HostConnector`], does its
//! work against a freshly listed artifact set and closes the session: a
//! self-opened document is saved after changes, an externally owned one is
//! left open. A fatal failure never saves.

use std::path::{Path, PathBuf};

use vbasync_core::{ArtifactHost, HostConnector, HostSession, SessionClose};

use crate::apply::{apply, preview, ApplyReport};
use crate::diff::{diff_tree, ArtifactDiff};
use crate::error::SyncError;
use crate::index::DirectoryIndex;
use crate::plan::{plan_file_change, plan_file_removal, reconcile, SyncPlan};
use crate::pull::{pull_into, PullReport};

/// What a push reconciles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushScope {
    /// Every file under a source directory (full sync).
    Tree(PathBuf),
    /// One file that was created or modified.
    Changed(PathBuf),
    /// One file that was deleted.
    Deleted(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResult {
    pub report: ApplyReport,
    pub session: SessionClose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullResult {
    pub report: PullReport,
    pub session: SessionClose,
}

/// Reconcile `scope` into `document`.
///
/// With `dry_run` the plan is reported and the host is left untouched.
pub fn push<C: HostConnector>(
    connector: &C,
    document: &Path,
    scope: PushScope,
    dry_run: bool,
) -> Result<PushResult, SyncError> {
    let mut session = connector.connect(document)?;
    let plan = match plan_for(session.host(), &scope) {
        Ok(plan) => plan,
        Err(err) => {
            close_unsaved(session);
            return Err(err);
        }
    };

    if dry_run {
        return Ok(PushResult {
            report: preview(plan),
            session: session.abandon(),
        });
    }

    let report = match apply(session.host_mut(), plan) {
        Ok(report) => report,
        Err(err) => {
            close_unsaved(session);
            return Err(err);
        }
    };
    let session = if report.has_changes() {
        session.finish()?
    } else {
        session.abandon()
    };
    tracing::info!(
        "{} applied, {} skipped, {} failed ({session:?})",
        report.applied(),
        report.skipped(),
        report.failed()
    );
    Ok(PushResult { report, session })
}

fn plan_for<H: ArtifactHost>(host: &H, scope: &PushScope) -> Result<SyncPlan, SyncError> {
    let artifacts = host.list_artifacts()?;
    match scope {
        PushScope::Tree(root) => Ok(reconcile(&DirectoryIndex::build(root), &artifacts)),
        PushScope::Changed(path) => plan_file_change(path, &artifacts),
        PushScope::Deleted(path) => {
            let logical_name =
                DirectoryIndex::logical_name(path).ok_or_else(|| SyncError::UnnamedPath {
                    path: path.clone(),
                })?;
            Ok(plan_file_removal(&logical_name, &artifacts))
        }
    }
}

fn close_unsaved<H: ArtifactHost>(session: HostSession<H>) {
    let document = session.document().display().to_string();
    let close = session.abandon();
    tracing::warn!("closing {document} without saving ({close:?})");
}

/// Export every artifact of `document` into `output_dir`. The document is
/// never saved.
pub fn pull<C: HostConnector>(
    connector: &C,
    document: &Path,
    output_dir: &Path,
) -> Result<PullResult, SyncError> {
    let session = connector.connect(document)?;
    let report = pull_into(session.host(), output_dir)?;
    Ok(PullResult {
        report,
        session: session.abandon(),
    })
}

/// Compare `source_dir` with `document` without changing either.
pub fn diff<C: HostConnector>(
    connector: &C,
    document: &Path,
    source_dir: &Path,
) -> Result<Vec<ArtifactDiff>, SyncError> {
    let session = connector.connect(document)?;
    let diffs = diff_tree(session.host(), source_dir)?;
    session.abandon();
    Ok(diffs)
}
