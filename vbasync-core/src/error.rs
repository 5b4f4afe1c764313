//! Error types for vbasync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ArtifactName;

/// Failures reading or converting text files.
#[derive(Debug, Error)]
pub enum TextError {
    /// Underlying I/O failure, with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid in the expected encoding.
    #[error("cannot decode {path} as {encoding}: byte 0x{byte:02X} at offset {offset}")]
    Decode {
        path: PathBuf,
        encoding: &'static str,
        byte: u8,
        offset: usize,
    },
}

/// All errors a document host can report.
#[derive(Debug, Error)]
pub enum HostError {
    /// The document or its host cannot be reached.
    #[error("document {document} is not accessible: {reason}")]
    Unavailable { document: PathBuf, reason: String },

    /// The document opened fine but carries no code project.
    #[error("document {document} has no code project")]
    NoProject { document: PathBuf },

    /// No artifact with that name exists.
    #[error("artifact '{name}' not found")]
    NotFound { name: ArtifactName },

    /// Document modules are owned by the document structure.
    #[error("artifact '{name}' is a document module and cannot be removed")]
    CannotRemoveIntrinsic { name: ArtifactName },

    /// An import would create a second artifact with an existing name.
    #[error("artifact '{name}' already exists")]
    NameConflict { name: ArtifactName },

    /// Artifact text contains a character the host code page cannot hold.
    #[error("artifact '{name}' contains {ch:?}, which has no Windows-1252 encoding")]
    Unencodable { name: ArtifactName, ch: char },

    /// Reading an import source failed.
    #[error(transparent)]
    Text(#[from] TextError),

    /// I/O failure on an export destination or the document file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing the document failed.
    #[error("document serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl HostError {
    /// Connectivity failures abort a whole operation; everything else is
    /// contained to the artifact it concerns.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HostError::Unavailable { .. } | HostError::NoProject { .. })
    }
}

/// Convenience constructor for [`HostError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> HostError {
    HostError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`TextError::Io`].
pub(crate) fn text_io_err(path: impl Into<PathBuf>, source: std::io::Error) -> TextError {
    TextError::Io {
        path: path.into(),
        source,
    }
}
