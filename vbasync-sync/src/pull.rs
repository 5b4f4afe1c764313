//! Export every host artifact into a source tree.

use std::fmt;
use std::path::{Path, PathBuf};

use vbasync_core::normalize::clean_exported_file;
use vbasync_core::{classify, ArtifactHost, ArtifactName, HostError, TextError};

use crate::error::{io_err, SyncError};

/// Outcome of exporting one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Exported and converted to UTF-8; `stripped` when the header was
    /// removed as well.
    Exported {
        name: ArtifactName,
        path: PathBuf,
        stripped: bool,
    },
    /// Exported, but the file could not be decoded and was left in the
    /// host's encoding.
    Unconverted {
        name: ArtifactName,
        path: PathBuf,
        error: String,
    },
    Failed { name: ArtifactName, error: String },
}

impl fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportOutcome::Exported {
                name,
                path,
                stripped,
            } => {
                write!(f, "exported '{name}' to {}", path.display())?;
                if *stripped {
                    write!(f, " (header removed)")?;
                }
                Ok(())
            }
            ExportOutcome::Unconverted { name, path, error } => write!(
                f,
                "exported '{name}' to {} but left it unconverted: {error}",
                path.display()
            ),
            ExportOutcome::Failed { name, error } => {
                write!(f, "failed to export '{name}': {error}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullReport {
    pub outcomes: Vec<ExportOutcome>,
    /// False when the document carries no code project.
    pub has_project: bool,
}

impl PullReport {
    pub fn exported(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o, ExportOutcome::Failed { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.exported()
    }
}

/// Export every artifact of `host` below `output_dir`, one subdirectory per
/// kind.
///
/// A document without a code project gives an empty report. Losing the host
/// aborts; any other per-artifact failure is reported and the pull goes on.
pub fn pull_into<H: ArtifactHost>(host: &H, output_dir: &Path) -> Result<PullReport, SyncError> {
    let artifacts = match host.list_artifacts() {
        Ok(artifacts) => artifacts,
        Err(HostError::NoProject { document }) => {
            tracing::warn!("{} has no code project, nothing to export", document.display());
            return Ok(PullReport::default());
        }
        Err(err) => return Err(err.into()),
    };
    std::fs::create_dir_all(output_dir).map_err(|e| io_err(output_dir, e))?;

    let mut report = PullReport {
        outcomes: Vec::with_capacity(artifacts.len()),
        has_project: true,
    };
    for artifact in artifacts {
        let destination = classify(artifact.kind).path_in(output_dir, &artifact.name);
        match export_one(host, &artifact.name, &destination) {
            Ok(()) => {}
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                tracing::warn!("failed to export '{}': {err}", artifact.name);
                report.outcomes.push(ExportOutcome::Failed {
                    name: artifact.name,
                    error: err.to_string(),
                });
                continue;
            }
        }

        let strip = artifact.kind.strips_export_header();
        let outcome = match clean_exported_file(&destination, strip) {
            Ok(cleaned) => ExportOutcome::Exported {
                name: artifact.name,
                path: cleaned.path,
                stripped: cleaned.stripped,
            },
            Err(err @ TextError::Decode { .. }) => {
                tracing::warn!("{err}; keeping the file as exported");
                ExportOutcome::Unconverted {
                    name: artifact.name,
                    path: destination,
                    error: err.to_string(),
                }
            }
            Err(err) => ExportOutcome::Failed {
                name: artifact.name,
                error: err.to_string(),
            },
        };
        tracing::info!("{outcome}");
        report.outcomes.push(outcome);
    }
    Ok(report)
}

fn export_one<H: ArtifactHost>(
    host: &H,
    name: &ArtifactName,
    destination: &Path,
) -> Result<(), HostError> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|source| HostError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    host.export_artifact(name, destination)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use vbasync_core::memory::{MemoryArtifact, MemoryHost};
    use vbasync_core::ArtifactKind;

    use super::*;

    fn host() -> MemoryHost {
        MemoryHost::with_project(vec![
            MemoryArtifact::new(
                "Module1",
                ArtifactKind::StandardModule,
                "Sub Grüße()\r\nEnd Sub",
            ),
            MemoryArtifact::new("Invoice", ArtifactKind::ClassModule, "Public Total As Double"),
            MemoryArtifact::new("Tabelle1", ArtifactKind::DocumentModule, ""),
            MemoryArtifact::new(
                "Dialog",
                ArtifactKind::FormModule,
                "Private Sub UserForm_Click()\r\nEnd Sub",
            ),
        ])
    }

    #[test]
    fn writes_one_file_per_artifact_in_kind_directories() {
        let tmp = TempDir::new().expect("tmp");
        let out = tmp.path().join("vba_src");

        let report = pull_into(&host(), &out).expect("pull");
        assert!(report.has_project);
        assert_eq!(report.exported(), 4);
        assert!(out.join("Modules/Module1.bas").is_file());
        assert!(out.join("ClassModules/Invoice.cls").is_file());
        assert!(out.join("Sheets/Tabelle1.cls").is_file());
        assert!(out.join("UserForms/Dialog.frm").is_file());
        assert!(!out.join("Misc").exists(), "subdirectories are created on demand");
    }

    #[test]
    fn standard_modules_are_stripped_and_utf8() {
        let tmp = TempDir::new().expect("tmp");
        pull_into(&host(), tmp.path()).expect("pull");
        assert_eq!(
            fs::read_to_string(tmp.path().join("Modules/Module1.bas")).expect("utf-8"),
            "Sub Grüße()\r\nEnd Sub"
        );
    }

    #[test]
    fn classes_keep_their_header() {
        let tmp = TempDir::new().expect("tmp");
        let report = pull_into(&host(), tmp.path()).expect("pull");
        let class = fs::read_to_string(tmp.path().join("ClassModules/Invoice.cls")).expect("read");
        assert!(class.starts_with("VERSION 1.0 CLASS\r\n"));
        assert!(class.contains("Attribute VB_Name = \"Invoice\""));
        assert!(report.outcomes.iter().any(|o| matches!(
            o,
            ExportOutcome::Exported { stripped: false, name, .. } if name.0 == "Invoice"
        )));
    }

    #[test]
    fn no_project_is_an_empty_pull() {
        let tmp = TempDir::new().expect("tmp");
        let out = tmp.path().join("vba_src");
        let report = pull_into(&MemoryHost::without_project(), &out).expect("pull");
        assert!(!report.has_project);
        assert!(report.outcomes.is_empty());
        assert!(!out.exists());
    }

    #[test]
    fn unencodable_artifact_fails_alone() {
        let tmp = TempDir::new().expect("tmp");
        let host = MemoryHost::with_project(vec![
            MemoryArtifact::new("Emoji", ArtifactKind::StandardModule, "x = \"\u{1F600}\""),
            MemoryArtifact::new("Plain", ArtifactKind::StandardModule, "y = 1"),
        ]);
        let report = pull_into(&host, tmp.path()).expect("pull");
        assert_eq!(report.failed(), 1);
        assert_eq!(report.exported(), 1);
        assert!(tmp.path().join("Modules/Plain.bas").is_file());
    }

    #[test]
    fn host_loss_aborts() {
        let tmp = TempDir::new().expect("tmp");
        let mut host = host();
        host.disconnect_after(0);
        let _ = host.remove_artifact(&ArtifactName::from("Module1"));

        let err = pull_into(&host, tmp.path()).unwrap_err();
        assert!(err.is_host_failure(), "got: {err}");
    }
}
