//! Reconciliation: what has to happen to bring the host in line with a tree.
//!
//! ## Full sync
//!
//! 1. Key host artifacts by lower-cased name.
//! 2. Every indexed file is read and normalized; a known name becomes an
//!    `Update`, an unknown one an `Import` of the raw file.
//! 3. Host names with no file become `Remove`, except intrinsic artifacts,
//!    which are skipped.
//!
//! A [`SyncPlan`] always lists updates and imports before removals.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use vbasync_core::codepage::{read_text, Encoding};
use vbasync_core::{find_artifact, normalize, Artifact, ArtifactName, TextError};

use crate::error::SyncError;
use crate::index::DirectoryIndex;

// ---------------------------------------------------------------------------
// Plan types
// ---------------------------------------------------------------------------

/// One change to apply to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Replace the body of an existing artifact with the normalized content
    /// of `path`.
    Update {
        artifact: Artifact,
        path: PathBuf,
        content: String,
    },
    /// Create a new artifact from a file.
    Import { path: PathBuf },
    /// Remove an artifact that no longer has a file.
    Remove { name: ArtifactName },
}

impl SyncAction {
    /// Artifact name or file the action concerns, for reporting.
    pub fn subject(&self) -> String {
        match self {
            SyncAction::Update { artifact, .. } => artifact.name.0.clone(),
            SyncAction::Import { path } => path.display().to_string(),
            SyncAction::Remove { name } => name.0.clone(),
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, SyncAction::Remove { .. })
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Update { artifact, .. } => write!(f, "update '{}'", artifact.name),
            SyncAction::Import { path } => write!(f, "import {}", path.display()),
            SyncAction::Remove { name } => write!(f, "remove '{name}'"),
        }
    }
}

/// Why something in the tree or host was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Host-owned artifact without a file; never removed.
    Intrinsic,
    /// The file could not be read or decoded.
    Unreadable(String),
    /// The artifact to remove is not in the host.
    NotFound,
    /// A file in the same run claims this name but could not be imported, so
    /// the artifact is kept.
    Claimed(PathBuf),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Intrinsic => write!(f, "document module, not removed"),
            SkipReason::Unreadable(err) => write!(f, "unreadable: {err}"),
            SkipReason::NotFound => write!(f, "not in the document, nothing to remove"),
            SkipReason::Claimed(path) => {
                write!(f, "kept, {} still declares this name", path.display())
            }
        }
    }
}

/// Something deliberately not acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub subject: String,
    pub reason: SkipReason,
}

/// Ordered actions plus the items skipped while planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    actions: Vec<SyncAction>,
    skipped: Vec<Skipped>,
}

impl SyncPlan {
    /// Assemble a plan; `writes` (updates and imports) precede `removals`.
    pub fn new(writes: Vec<SyncAction>, removals: Vec<SyncAction>, skipped: Vec<Skipped>) -> Self {
        let mut actions = writes;
        actions.extend(removals);
        // Stable: relative order inside each group is kept.
        actions.sort_by_key(SyncAction::is_removal);
        Self { actions, skipped }
    }

    pub fn single(action: SyncAction) -> Self {
        Self::new(vec![action], vec![], vec![])
    }

    pub fn skip(subject: impl Into<String>, reason: SkipReason) -> Self {
        Self::new(
            vec![],
            vec![],
            vec![Skipped {
                subject: subject.into(),
                reason,
            }],
        )
    }

    pub fn actions(&self) -> &[SyncAction] {
        &self.actions
    }

    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.skipped.is_empty()
    }

    pub fn into_parts(self) -> (Vec<SyncAction>, Vec<Skipped>) {
        (self.actions, self.skipped)
    }
}

// ---------------------------------------------------------------------------
// Full sync
// ---------------------------------------------------------------------------

/// Compute the full-sync plan for `index` against the host's `artifacts`.
pub fn reconcile(index: &DirectoryIndex, artifacts: &[Artifact]) -> SyncPlan {
    let known: HashMap<String, &Artifact> = artifacts
        .iter()
        .map(|artifact| (artifact.name.logical(), artifact))
        .collect();

    let mut writes = Vec::new();
    let mut skipped = Vec::new();
    for (logical_name, path) in index.iter() {
        let content = match read_normalized(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("skipping {}: {err}", path.display());
                skipped.push(Skipped {
                    subject: path.display().to_string(),
                    reason: SkipReason::Unreadable(err.to_string()),
                });
                continue;
            }
        };
        match known.get(logical_name) {
            Some(artifact) => writes.push(SyncAction::Update {
                artifact: (*artifact).clone(),
                path: path.to_path_buf(),
                content,
            }),
            None => writes.push(SyncAction::Import {
                path: path.to_path_buf(),
            }),
        }
    }

    let mut removals = Vec::new();
    for artifact in artifacts {
        if index.contains(&artifact.name.logical()) {
            continue;
        }
        if artifact.intrinsic {
            tracing::info!("keeping document module '{}' with no file", artifact.name);
            skipped.push(Skipped {
                subject: artifact.name.0.clone(),
                reason: SkipReason::Intrinsic,
            });
        } else {
            removals.push(SyncAction::Remove {
                name: artifact.name.clone(),
            });
        }
    }

    SyncPlan::new(writes, removals, skipped)
}

/// Read a source file as UTF-8 and normalize it.
pub fn read_normalized(path: &Path) -> Result<String, TextError> {
    read_text(path, Encoding::Utf8).map(|text| normalize(&text))
}

// ---------------------------------------------------------------------------
// Single artifact
// ---------------------------------------------------------------------------

/// Action for a created or modified file: update when the host knows the
/// name, import otherwise.
pub fn reconcile_one(path: &Path, artifacts: &[Artifact]) -> Result<SyncAction, SyncError> {
    let logical_name = DirectoryIndex::logical_name(path).ok_or_else(|| SyncError::UnnamedPath {
        path: path.to_path_buf(),
    })?;
    let content = read_normalized(path)?;
    Ok(match find_artifact(artifacts, &logical_name) {
        Some(artifact) => SyncAction::Update {
            artifact: artifact.clone(),
            path: path.to_path_buf(),
            content,
        },
        None => SyncAction::Import {
            path: path.to_path_buf(),
        },
    })
}

/// Outcome of planning a deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Remove(SyncAction),
    /// Nothing by that name; already gone.
    Absent,
    /// Present but host-owned.
    Intrinsic(ArtifactName),
}

/// Decide what a deleted file means for the host.
pub fn reconcile_one_removal(logical_name: &str, artifacts: &[Artifact]) -> Removal {
    match find_artifact(artifacts, logical_name) {
        None => Removal::Absent,
        Some(artifact) if artifact.intrinsic => Removal::Intrinsic(artifact.name.clone()),
        Some(artifact) => Removal::Remove(SyncAction::Remove {
            name: artifact.name.clone(),
        }),
    }
}

/// [`reconcile_one`] as a plan; an unreadable file becomes a skip.
pub fn plan_file_change(path: &Path, artifacts: &[Artifact]) -> Result<SyncPlan, SyncError> {
    match reconcile_one(path, artifacts) {
        Ok(action) => Ok(SyncPlan::single(action)),
        Err(SyncError::Text(err)) => {
            tracing::warn!("skipping {}: {err}", path.display());
            Ok(SyncPlan::skip(
                path.display().to_string(),
                SkipReason::Unreadable(err.to_string()),
            ))
        }
        Err(err) => Err(err),
    }
}

/// [`reconcile_one_removal`] as a plan.
pub fn plan_file_removal(logical_name: &str, artifacts: &[Artifact]) -> SyncPlan {
    match reconcile_one_removal(logical_name, artifacts) {
        Removal::Remove(action) => SyncPlan::single(action),
        Removal::Absent => {
            tracing::info!("'{logical_name}' is not in the document, nothing to remove");
            SyncPlan::skip(logical_name, SkipReason::NotFound)
        }
        Removal::Intrinsic(name) => {
            tracing::info!("document module '{name}' cannot be removed");
            SyncPlan::skip(name.0, SkipReason::Intrinsic)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
