//! Executing a [`SyncPlan`] against a host.
//!
//! Actions run in plan order. A connectivity failure stops the run: it is
//! reported as [`SyncError::Host`] when nothing was applied yet and as
//! [`SyncError::PartiallyApplied`] otherwise. Any other failure is contained
//! to its action and recorded in the [`ApplyReport`].
//!
//! A write that fails because its file declares the name of an existing
//! artifact holds that artifact: a later removal of the same name in the run
//! is skipped, so a renamed file never costs the host its only copy.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use vbasync_core::{ArtifactHost, ArtifactName, HostError};

use crate::error::SyncError;
use crate::plan::{SkipReason, Skipped, SyncAction, SyncPlan};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to one planned action or skipped item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Updated { name: ArtifactName },
    Imported { name: ArtifactName, path: PathBuf },
    Removed { name: ArtifactName },
    /// Dry run: the action would have been applied.
    WouldApply(SyncAction),
    Skipped(Skipped),
    Failed { subject: String, error: String },
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            ActionOutcome::Updated { .. }
                | ActionOutcome::Imported { .. }
                | ActionOutcome::Removed { .. }
        )
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Updated { name } => write!(f, "updated '{name}'"),
            ActionOutcome::Imported { name, path } => {
                write!(f, "imported '{name}' from {}", path.display())
            }
            ActionOutcome::Removed { name } => write!(f, "removed '{name}'"),
            ActionOutcome::WouldApply(action) => write!(f, "would {action}"),
            ActionOutcome::Skipped(skip) => write!(f, "skipped {}: {}", skip.subject, skip.reason),
            ActionOutcome::Failed { subject, error } => write!(f, "failed {subject}: {error}"),
        }
    }
}

/// Per-item outcomes of one apply or preview.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub outcomes: Vec<ActionOutcome>,
}

impl ApplyReport {
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ActionOutcome::Skipped(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ActionOutcome::Failed { .. }))
            .count()
    }

    /// True when something changed in the host.
    pub fn has_changes(&self) -> bool {
        self.applied() > 0
    }
}

// ---------------------------------------------------------------------------
// apply / preview
// ---------------------------------------------------------------------------

/// Apply `plan` to `host`. The host is not saved here.
pub fn apply<H: ArtifactHost>(host: &mut H, plan: SyncPlan) -> Result<ApplyReport, SyncError> {
    let (actions, skipped) = plan.into_parts();
    let total = actions.len();
    let mut report = ApplyReport {
        outcomes: skipped.into_iter().map(ActionOutcome::Skipped).collect(),
    };

    // Logical name → file whose write was refused over that name.
    let mut held: HashMap<String, PathBuf> = HashMap::new();

    for action in actions {
        if let SyncAction::Remove { name } = &action {
            if let Some(path) = held.get(&name.logical()) {
                let skip = Skipped {
                    subject: name.0.clone(),
                    reason: SkipReason::Claimed(path.clone()),
                };
                tracing::warn!("skipped {}: {}", skip.subject, skip.reason);
                report.outcomes.push(ActionOutcome::Skipped(skip));
                continue;
            }
        }

        let subject = action.subject();
        let source = write_source(&action);
        match apply_action(host, action) {
            Ok(outcome) => {
                tracing::info!("{outcome}");
                report.outcomes.push(outcome);
            }
            Err(err) if err.is_fatal() => {
                let applied = report.applied();
                tracing::error!("host lost after {applied} of {total} actions: {err}");
                return Err(if applied == 0 {
                    SyncError::Host(err)
                } else {
                    SyncError::PartiallyApplied {
                        applied,
                        total,
                        source: err,
                    }
                });
            }
            Err(err) => {
                tracing::warn!("{subject}: {err}");
                if let (HostError::NameConflict { name }, Some(path)) = (&err, source) {
                    held.insert(name.logical(), path);
                }
                report.outcomes.push(ActionOutcome::Failed {
                    subject,
                    error: err.to_string(),
                });
            }
        }
    }
    Ok(report)
}

fn write_source(action: &SyncAction) -> Option<PathBuf> {
    match action {
        SyncAction::Update { path, .. } | SyncAction::Import { path } => Some(path.clone()),
        SyncAction::Remove { .. } => None,
    }
}

fn apply_action<H: ArtifactHost>(
    host: &mut H,
    action: SyncAction,
) -> Result<ActionOutcome, HostError> {
    match action {
        SyncAction::Update {
            artifact,
            path,
            content,
        } => match host.replace_artifact_body(&artifact.name, &content) {
            Ok(()) => Ok(ActionOutcome::Updated {
                name: artifact.name,
            }),
            // Gone since the artifact list was read: create it instead.
            Err(HostError::NotFound { .. }) => {
                tracing::debug!("'{}' vanished, importing {}", artifact.name, path.display());
                let name = host.import_artifact(&path)?;
                Ok(ActionOutcome::Imported { name, path })
            }
            Err(err) => Err(err),
        },
        SyncAction::Import { path } => {
            let name = host.import_artifact(&path)?;
            Ok(ActionOutcome::Imported { name, path })
        }
        SyncAction::Remove { name } => match host.remove_artifact(&name) {
            Ok(()) => Ok(ActionOutcome::Removed { name }),
            Err(HostError::CannotRemoveIntrinsic { name }) => Ok(ActionOutcome::Skipped(Skipped {
                subject: name.0,
                reason: SkipReason::Intrinsic,
            })),
            Err(HostError::NotFound { name }) => Ok(ActionOutcome::Skipped(Skipped {
                subject: name.0,
                reason: SkipReason::NotFound,
            })),
            Err(err) => Err(err),
        },
    }
}

/// Report what [`apply`] would do, without touching a host.
pub fn preview(plan: SyncPlan) -> ApplyReport {
    let (actions, skipped) = plan.into_parts();
    let mut outcomes: Vec<_> = skipped.into_iter().map(ActionOutcome::Skipped).collect();
    outcomes.extend(actions.into_iter().map(|action| {
        tracing::info!("[dry-run] would {action}");
        ActionOutcome::WouldApply(action)
    }));
    ApplyReport { outcomes }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use vbasync_core::memory::{HostCall, MemoryArtifact, MemoryHost};
    use vbasync_core::{Artifact, ArtifactKind};

    use super::*;

    fn host() -> MemoryHost {
        MemoryHost::with_project(vec![
            MemoryArtifact::new("A", ArtifactKind::StandardModule, "Sub Old()\r\nEnd Sub"),
            MemoryArtifact::new("C", ArtifactKind::ClassModule, ""),
            MemoryArtifact::new("D", ArtifactKind::DocumentModule, ""),
        ])
    }

    fn update(name: &str, content: &str) -> SyncAction {
        SyncAction::Update {
            artifact: Artifact::new(name, ArtifactKind::StandardModule),
            path: PathBuf::from(format!("{name}.bas")),
            content: content.to_owned(),
        }
    }

    fn remove(name: &str) -> SyncAction {
        SyncAction::Remove {
            name: ArtifactName::from(name),
        }
    }

    #[test]
    fn writes_happen_before_removals() {
        let tmp = TempDir::new().expect("tmp");
        let b = tmp.path().join("B.bas");
        fs::write(&b, "Sub B()\nEnd Sub").expect("write");
        let mut host = host();

        let plan = SyncPlan::new(
            vec![update("A", "Sub New()\r\nEnd Sub"), SyncAction::Import { path: b.clone() }],
            vec![remove("C")],
            vec![],
        );
        let report = apply(&mut host, plan).expect("apply");

        assert_eq!(report.applied(), 3);
        assert_eq!(
            host.journal(),
            vec![
                HostCall::Replace(ArtifactName::from("A")),
                HostCall::Import(b),
                HostCall::Remove(ArtifactName::from("C")),
            ]
        );
        assert_eq!(host.body("A").as_deref(), Some("Sub New()\r\nEnd Sub"));
        assert_eq!(host.names(), ["A", "D", "B"]);
        assert_eq!(host.save_count(), 0, "apply never saves");
    }

    #[test]
    fn empty_update_keeps_the_artifact() {
        let mut host = host();
        apply(&mut host, SyncPlan::single(update("A", ""))).expect("apply");
        assert_eq!(host.body("A").as_deref(), Some(""));
    }

    #[test]
    fn intrinsic_removal_is_reported_as_skip() {
        let mut host = host();
        let report = apply(&mut host, SyncPlan::single(remove("D"))).expect("apply");
        assert_eq!(
            report.outcomes,
            [ActionOutcome::Skipped(Skipped {
                subject: "D".into(),
                reason: SkipReason::Intrinsic
            })]
        );
        assert!(host.names().contains(&"D".to_owned()));
    }

    #[test]
    fn per_action_failure_does_not_stop_the_run() {
        let tmp = TempDir::new().expect("tmp");
        let dup = tmp.path().join("C.cls");
        fs::write(&dup, "VERSION 1.0 CLASS\nAttribute VB_Name = \"C\"\nx").expect("write");
        let mut host = host();

        let plan = SyncPlan::new(
            vec![SyncAction::Import { path: dup }, update("A", "y")],
            vec![],
            vec![],
        );
        let report = apply(&mut host, plan).expect("apply");
        assert_eq!(report.failed(), 1);
        assert_eq!(report.applied(), 1);
        match &report.outcomes[0] {
            ActionOutcome::Failed { error, .. } => assert!(error.contains("already exists")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn refused_import_keeps_the_artifact_it_collides_with() {
        let tmp = TempDir::new().expect("tmp");
        // Renamed on disk, but the header still names the existing class.
        let renamed = tmp.path().join("Bill.cls");
        fs::write(&renamed, "VERSION 1.0 CLASS\nAttribute VB_Name = \"C\"\nx").expect("write");
        let mut host = host();

        let plan = SyncPlan::new(
            vec![SyncAction::Import {
                path: renamed.clone(),
            }],
            vec![remove("C"), remove("A")],
            vec![],
        );
        let report = apply(&mut host, plan).expect("apply");

        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.outcomes[1],
            ActionOutcome::Skipped(Skipped {
                subject: "C".into(),
                reason: SkipReason::Claimed(renamed),
            })
        );
        assert_eq!(report.outcomes[2], ActionOutcome::Removed { name: "A".into() });
        assert!(host.names().contains(&"C".to_owned()));
        assert!(!host.journal().contains(&HostCall::Remove(ArtifactName::from("C"))));
    }

    #[test]
    fn update_of_vanished_artifact_imports_the_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("Gone.bas");
        fs::write(&path, "Sub Gone()\nEnd Sub").expect("write");
        let mut host = host();

        let plan = SyncPlan::single(SyncAction::Update {
            artifact: Artifact::new("Gone", ArtifactKind::StandardModule),
            path: path.clone(),
            content: "Sub Gone()\r\nEnd Sub".into(),
        });
        let report = apply(&mut host, plan).expect("apply");
        assert_eq!(
            report.outcomes,
            [ActionOutcome::Imported {
                name: ArtifactName::from("Gone"),
                path
            }]
        );
    }

    #[test]
    fn host_loss_before_any_action_is_a_plain_host_error() {
        let mut host = host();
        host.disconnect_after(0);
        let err = apply(&mut host, SyncPlan::single(update("A", "x"))).unwrap_err();
        assert!(matches!(err, SyncError::Host(HostError::Unavailable { .. })), "got: {err}");
    }

    #[test]
    fn host_loss_mid_run_reports_partial_application() {
        let mut host = host();
        host.disconnect_after(1);
        let plan = SyncPlan::new(vec![update("A", "x")], vec![remove("C")], vec![]);
        let err = apply(&mut host, plan).unwrap_err();
        match err {
            SyncError::PartiallyApplied { applied, total, .. } => {
                assert_eq!((applied, total), (1, 2));
            }
            other => panic!("expected partial application, got {other}"),
        }
        assert_eq!(host.body("A").as_deref(), Some("x"), "applied actions stay");
    }

    #[test]
    fn preview_touches_nothing() {
        let host = host();
        let report = preview(SyncPlan::new(
            vec![update("A", "x")],
            vec![remove("C")],
            vec![Skipped {
                subject: "D".into(),
                reason: SkipReason::Intrinsic,
            }],
        ));
        assert_eq!(report.applied(), 0);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.outcomes.len(), 3);
        assert!(host.journal().is_empty());
    }
}
