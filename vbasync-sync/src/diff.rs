//! Read-only comparison of a source tree with a host.
//!
//! Both sides go through the normalizer, so header lines and trailing blank
//! lines never show up as differences.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use vbasync_core::codepage::{read_text, Encoding};
use vbasync_core::{classify, normalize, ArtifactHost, ArtifactName};

use crate::error::{io_err, SyncError};
use crate::index::DirectoryIndex;
use crate::plan::read_normalized;

/// One difference between the tree and the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactDiff {
    /// Both sides exist and their bodies differ.
    Changed {
        name: ArtifactName,
        path: PathBuf,
        unified_diff: String,
    },
    /// File without an artifact; a push would import it.
    New { path: PathBuf },
    /// Artifact without a file; a push would remove it.
    Removed { name: ArtifactName },
    /// The file could not be read.
    Unreadable { path: PathBuf, error: String },
}

/// Compare every file under `source_dir` with `host`. Nothing is written
/// outside a scratch directory.
pub fn diff_tree<H: ArtifactHost>(
    host: &H,
    source_dir: &Path,
) -> Result<Vec<ArtifactDiff>, SyncError> {
    let artifacts = host.list_artifacts()?;
    let index = DirectoryIndex::build(source_dir);
    let root = std::fs::canonicalize(source_dir).unwrap_or_else(|_| source_dir.to_path_buf());
    let scratch = tempfile::TempDir::new().map_err(|e| io_err(std::env::temp_dir(), e))?;

    let mut diffs = Vec::new();
    for (logical_name, path) in index.iter() {
        let local = match read_normalized(path) {
            Ok(text) => text,
            Err(err) => {
                diffs.push(ArtifactDiff::Unreadable {
                    path: path.to_path_buf(),
                    error: err.to_string(),
                });
                continue;
            }
        };
        let Some(artifact) = artifacts.iter().find(|a| a.name.logical() == logical_name) else {
            diffs.push(ArtifactDiff::New {
                path: path.to_path_buf(),
            });
            continue;
        };

        let exported = classify(artifact.kind).path_in(scratch.path(), &artifact.name);
        if let Some(parent) = exported.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        match host.export_artifact(&artifact.name, &exported) {
            Ok(()) => {}
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                diffs.push(ArtifactDiff::Unreadable {
                    path: path.to_path_buf(),
                    error: err.to_string(),
                });
                continue;
            }
        }
        let remote = normalize(&read_text(&exported, Encoding::Windows1252)?);

        if remote == local {
            tracing::debug!("'{}' unchanged", artifact.name);
            continue;
        }
        let relative = path.strip_prefix(&root).unwrap_or(path);
        diffs.push(ArtifactDiff::Changed {
            name: artifact.name.clone(),
            path: path.to_path_buf(),
            unified_diff: unified(&artifact.name, relative, &remote, &local),
        });
    }

    for artifact in &artifacts {
        if !artifact.intrinsic && !index.contains(&artifact.name.logical()) {
            diffs.push(ArtifactDiff::Removed {
                name: artifact.name.clone(),
            });
        }
    }
    Ok(diffs)
}

fn unified(name: &ArtifactName, relative: &Path, remote: &str, local: &str) -> String {
    let remote = with_trailing_newline(&remote.replace("\r\n", "\n"));
    let local = with_trailing_newline(&local.replace("\r\n", "\n"));
    let old_header = format!("a/{name}");
    let new_header = format!("b/{}", relative.display());
    TextDiff::from_lines(&remote, &local)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

fn with_trailing_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_owned()
    } else {
        format!("{text}\n")
    }
}
