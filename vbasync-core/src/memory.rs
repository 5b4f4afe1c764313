//! In-memory host.
//!
//! Clones of a [`MemoryHost`] share one state, so a test can hand a clone to
//! a [`MemoryConnector`] and inspect the journal afterwards. Every call is
//! bracketed by an in-flight counter; [`MemoryHost::max_in_flight`] above 1
//! means two host calls overlapped.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::HostError;
use crate::host::{ArtifactHost, HostConnector, HostSession, Ownership};
use crate::native::{read_import, write_export};
use crate::types::{Artifact, ArtifactKind, ArtifactName};

/// One recorded host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    List,
    Export(ArtifactName),
    Import(PathBuf),
    Replace(ArtifactName),
    Remove(ArtifactName),
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryArtifact {
    pub name: ArtifactName,
    pub kind: ArtifactKind,
    pub body: String,
}

impl MemoryArtifact {
    pub fn new(name: impl Into<ArtifactName>, kind: ArtifactKind, body: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            body: body.to_owned(),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    /// `None` models a document without a code project.
    project: Option<Vec<MemoryArtifact>>,
    journal: Vec<HostCall>,
    saves: usize,
    in_flight: usize,
    max_in_flight: usize,
    /// Mutating calls allowed before the host becomes unreachable.
    mutations_left: Option<usize>,
    disconnected: bool,
}

/// Shared in-memory artifact store.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    state: Arc<Mutex<MemoryState>>,
    call_delay: Duration,
}

impl MemoryHost {
    pub fn with_project(artifacts: Vec<MemoryArtifact>) -> Self {
        let host = Self::default();
        host.lock().project = Some(artifacts);
        host
    }

    /// A host whose document has no code project.
    pub fn without_project() -> Self {
        Self::default()
    }

    /// Hold every call open for `delay`, widening the window for overlaps.
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    /// Let `count` mutating calls succeed, then report the host unreachable.
    pub fn disconnect_after(&self, count: usize) {
        self.lock().mutations_left = Some(count);
    }

    pub fn journal(&self) -> Vec<HostCall> {
        self.lock().journal.clone()
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    pub fn body(&self, name: &str) -> Option<String> {
        self.lock()
            .project
            .as_ref()?
            .iter()
            .find(|a| a.name.matches(name))
            .map(|a| a.body.clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.lock()
            .project
            .as_ref()
            .map(|p| p.iter().map(|a| a.name.0.clone()).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not wedge the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn call<T>(
        &self,
        call: HostCall,
        mutating: bool,
        op: impl FnOnce(&mut MemoryState) -> Result<T, HostError>,
    ) -> Result<T, HostError> {
        {
            let mut state = self.lock();
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
        }
        if !self.call_delay.is_zero() {
            std::thread::sleep(self.call_delay);
        }

        let mut state = self.lock();
        state.in_flight -= 1;
        state.journal.push(call);
        if mutating {
            match state.mutations_left {
                Some(0) => state.disconnected = true,
                Some(n) => state.mutations_left = Some(n - 1),
                None => {}
            }
        }
        if state.disconnected {
            return Err(HostError::Unavailable {
                document: PathBuf::from("memory"),
                reason: "host disconnected".to_owned(),
            });
        }
        op(&mut state)
    }
}

fn project(state: &mut MemoryState) -> Result<&mut Vec<MemoryArtifact>, HostError> {
    state.project.as_mut().ok_or(HostError::NoProject {
        document: PathBuf::from("memory"),
    })
}

fn position(artifacts: &[MemoryArtifact], name: &ArtifactName) -> Result<usize, HostError> {
    let key = name.logical();
    artifacts
        .iter()
        .position(|a| a.name.logical() == key)
        .ok_or_else(|| HostError::NotFound { name: name.clone() })
}

impl ArtifactHost for MemoryHost {
    fn list_artifacts(&self) -> Result<Vec<Artifact>, HostError> {
        self.call(HostCall::List, false, |state| {
            Ok(project(state)?
                .iter()
                .map(|a| Artifact::new(a.name.clone(), a.kind))
                .collect())
        })
    }

    fn export_artifact(&self, name: &ArtifactName, destination: &Path) -> Result<(), HostError> {
        self.call(HostCall::Export(name.clone()), false, |state| {
            let artifacts = project(state)?;
            let idx = position(artifacts, name)?;
            let artifact = &artifacts[idx];
            write_export(destination, &artifact.name, artifact.kind, &artifact.body)
        })
    }

    fn import_artifact(&mut self, path: &Path) -> Result<ArtifactName, HostError> {
        self.call(HostCall::Import(path.to_path_buf()), true, |state| {
            let imported = read_import(path)?;
            let artifacts = project(state)?;
            if position(artifacts, &imported.name).is_ok() {
                return Err(HostError::NameConflict {
                    name: imported.name,
                });
            }
            let name = imported.name.clone();
            artifacts.push(MemoryArtifact {
                name: imported.name,
                kind: imported.kind,
                body: imported.body,
            });
            Ok(name)
        })
    }

    fn replace_artifact_body(
        &mut self,
        name: &ArtifactName,
        content: &str,
    ) -> Result<(), HostError> {
        self.call(HostCall::Replace(name.clone()), true, |state| {
            let artifacts = project(state)?;
            let idx = position(artifacts, name)?;
            artifacts[idx].body.clear();
            artifacts[idx].body.push_str(content);
            Ok(())
        })
    }

    fn remove_artifact(&mut self, name: &ArtifactName) -> Result<(), HostError> {
        self.call(HostCall::Remove(name.clone()), true, |state| {
            let artifacts = project(state)?;
            let idx = position(artifacts, name)?;
            if artifacts[idx].kind.is_intrinsic() {
                return Err(HostError::CannotRemoveIntrinsic {
                    name: artifacts[idx].name.clone(),
                });
            }
            artifacts.remove(idx);
            Ok(())
        })
    }

    fn save(&mut self) -> Result<(), HostError> {
        self.call(HostCall::Save, false, |state| {
            state.saves += 1;
            Ok(())
        })
    }
}

/// Hands out sessions on one shared [`MemoryHost`].
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    host: MemoryHost,
    ownership: Ownership,
}

impl MemoryConnector {
    pub fn new(host: MemoryHost, ownership: Ownership) -> Self {
        Self { host, ownership }
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }
}

impl HostConnector for MemoryConnector {
    type Host = MemoryHost;

    fn connect(&self, document: &Path) -> Result<HostSession<MemoryHost>, HostError> {
        if self.host.lock().disconnected {
            return Err(HostError::Unavailable {
                document: document.to_path_buf(),
                reason: "host disconnected".to_owned(),
            });
        }
        Ok(HostSession::new(self.host.clone(), self.ownership, document))
    }
}
