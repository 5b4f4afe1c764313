//! Document container host.
//!
//! A document file carries its code project as YAML:
//!
//! ```text
//! version: 1
//! project:
//!   name: VBAProject
//!   components:
//!     - name: Module1
//!       kind: standard_module
//!       body: |
//!         Sub Main()
//!         End Sub
//! updated_at: 2026-01-01T00:00:00Z
//! ```
//!
//! The file is loaded when a session opens and only written by
//! [`ArtifactHost::save`]; bodies are stored with LF line endings.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, HostError};
use crate::host::{ArtifactHost, HostConnector, HostSession, Ownership};
use crate::native::{read_import, write_export};
use crate::types::{Artifact, ArtifactKind, ArtifactName};

pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// On-disk format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub name: ArtifactName,
    pub kind: ArtifactKind,
    #[serde(default)]
    pub body: String,
}

impl Component {
    pub fn new(name: impl Into<ArtifactName>, kind: ArtifactKind, body: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            body: to_lf(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeProject {
    pub name: String,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<CodeProject>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// An open document container.
#[derive(Debug)]
pub struct DocumentHost {
    path: PathBuf,
    document: Document,
}

impl DocumentHost {
    /// Load the document at `path`.
    ///
    /// Missing, unreadable or malformed documents are
    /// [`HostError::Unavailable`].
    pub fn open(path: &Path) -> Result<Self, HostError> {
        let unavailable = |reason: String| HostError::Unavailable {
            document: path.to_path_buf(),
            reason,
        };
        if !path.is_file() {
            return Err(unavailable("file not found".to_owned()));
        }
        let contents = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
        let document: Document = serde_yaml::from_str(&contents)
            .map_err(|e| unavailable(format!("not a document container: {e}")))?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Write a new document to `path` and open it.
    pub fn create(path: &Path, project: Option<CodeProject>) -> Result<Self, HostError> {
        let mut host = Self {
            path: path.to_path_buf(),
            document: Document {
                version: DOCUMENT_FORMAT_VERSION,
                project,
                updated_at: Utc::now(),
            },
        };
        host.save()?;
        Ok(host)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current body of a component, if present.
    pub fn body(&self, name: &str) -> Option<&str> {
        self.document
            .project
            .as_ref()?
            .components
            .iter()
            .find(|c| c.name.matches(name))
            .map(|c| c.body.as_str())
    }

    fn project(&self) -> Result<&CodeProject, HostError> {
        self.document.project.as_ref().ok_or_else(|| HostError::NoProject {
            document: self.path.clone(),
        })
    }

    fn project_mut(&mut self) -> Result<&mut CodeProject, HostError> {
        let document = self.path.clone();
        self.document
            .project
            .as_mut()
            .ok_or(HostError::NoProject { document })
    }

    fn position(&self, name: &ArtifactName) -> Result<usize, HostError> {
        let key = name.logical();
        self.project()?
            .components
            .iter()
            .position(|c| c.name.logical() == key)
            .ok_or_else(|| HostError::NotFound { name: name.clone() })
    }
}

impl ArtifactHost for DocumentHost {
    fn list_artifacts(&self) -> Result<Vec<Artifact>, HostError> {
        Ok(self
            .project()?
            .components
            .iter()
            .map(|c| Artifact::new(c.name.clone(), c.kind))
            .collect())
    }

    fn export_artifact(&self, name: &ArtifactName, destination: &Path) -> Result<(), HostError> {
        let idx = self.position(name)?;
        let component = &self.project()?.components[idx];
        write_export(destination, &component.name, component.kind, &component.body)
    }

    fn import_artifact(&mut self, path: &Path) -> Result<ArtifactName, HostError> {
        let imported = read_import(path)?;
        if self.position(&imported.name).is_ok() {
            return Err(HostError::NameConflict {
                name: imported.name,
            });
        }
        let name = imported.name.clone();
        self.project_mut()?
            .components
            .push(Component::new(imported.name, imported.kind, &imported.body));
        Ok(name)
    }

    fn replace_artifact_body(
        &mut self,
        name: &ArtifactName,
        content: &str,
    ) -> Result<(), HostError> {
        let idx = self.position(name)?;
        let component = &mut self.project_mut()?.components[idx];
        component.body.clear();
        component.body.push_str(&to_lf(content));
        Ok(())
    }

    fn remove_artifact(&mut self, name: &ArtifactName) -> Result<(), HostError> {
        let idx = self.position(name)?;
        let project = self.project_mut()?;
        if project.components[idx].kind.is_intrinsic() {
            return Err(HostError::CannotRemoveIntrinsic {
                name: project.components[idx].name.clone(),
            });
        }
        project.components.remove(idx);
        Ok(())
    }

    /// Atomic save: serialize → `<path>.tmp` → rename.
    fn save(&mut self) -> Result<(), HostError> {
        self.document.updated_at = Utc::now();
        let yaml = serde_yaml::to_string(&self.document)?;
        let tmp = PathBuf::from(format!("{}.tmp", self.path.display()));
        std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&self.path, e));
        }
        Ok(())
    }
}

/// Opens [`DocumentHost`] sessions. Every session is self-opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentConnector;

impl HostConnector for DocumentConnector {
    type Host = DocumentHost;

    fn connect(&self, document: &Path) -> Result<HostSession<DocumentHost>, HostError> {
        let host = DocumentHost::open(document)?;
        Ok(HostSession::new(host, Ownership::SelfOpened, document))
    }
}

fn to_lf(text: &str) -> String {
    text.replace("\r\n", "\n")
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
