//! The document host seam.
//!
//! [`ArtifactHost`] is the set of operations the reconciler needs from
//! whatever owns the artifacts. [`HostConnector`] opens a [`HostSession`]
//! for a document; the session records whether this process opened the
//! document itself, which decides whether it may be saved.

use std::path::{Path, PathBuf};

use crate::error::HostError;
use crate::types::{Artifact, ArtifactName};

/// Operations on the artifacts of one open document.
pub trait ArtifactHost {
    /// Current artifact set. Fails with [`HostError::NoProject`] when the
    /// document has no code project.
    fn list_artifacts(&self) -> Result<Vec<Artifact>, HostError>;

    /// Write the artifact's current text to `destination` in the host's
    /// native encoding.
    fn export_artifact(&self, name: &ArtifactName, destination: &Path) -> Result<(), HostError>;

    /// Create a new artifact from a file; the host derives the name from the
    /// file's metadata.
    fn import_artifact(&mut self, path: &Path) -> Result<ArtifactName, HostError>;

    /// Discard the artifact's body and insert `content`. Empty content leaves
    /// an empty body.
    fn replace_artifact_body(&mut self, name: &ArtifactName, content: &str)
        -> Result<(), HostError>;

    /// Remove an artifact. Fails with [`HostError::CannotRemoveIntrinsic`]
    /// for document modules.
    fn remove_artifact(&mut self, name: &ArtifactName) -> Result<(), HostError>;

    /// Persist the document.
    fn save(&mut self) -> Result<(), HostError>;
}

/// Who opened the document a session works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// This process opened the document; it saves and closes it.
    SelfOpened,
    /// The document was already open elsewhere; never saved or closed here.
    External,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionClose {
    /// Self-opened and saved.
    Saved,
    /// Self-opened and closed without saving.
    Discarded,
    /// Externally owned; changes are live in the document but unsaved.
    LeftOpen,
}

/// An open document plus its ownership tag.
#[derive(Debug)]
pub struct HostSession<H> {
    host: H,
    ownership: Ownership,
    document: PathBuf,
}

impl<H: ArtifactHost> HostSession<H> {
    pub fn new(host: H, ownership: Ownership, document: impl Into<PathBuf>) -> Self {
        Self {
            host,
            ownership,
            document: document.into(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn document(&self) -> &Path {
        &self.document
    }

    /// End the session after changes: save when self-opened.
    pub fn finish(mut self) -> Result<SessionClose, HostError> {
        match self.ownership {
            Ownership::SelfOpened => {
                self.host.save()?;
                Ok(SessionClose::Saved)
            }
            Ownership::External => Ok(SessionClose::LeftOpen),
        }
    }

    /// End the session without saving.
    pub fn abandon(self) -> SessionClose {
        match self.ownership {
            Ownership::SelfOpened => SessionClose::Discarded,
            Ownership::External => SessionClose::LeftOpen,
        }
    }
}

/// Opens sessions on documents.
pub trait HostConnector: Send + Sync {
    type Host: ArtifactHost;

    /// Fails with [`HostError::Unavailable`] when the document cannot be
    /// reached.
    fn connect(&self, document: &Path) -> Result<HostSession<Self::Host>, HostError>;
}
