//! Domain types for artifacts held by a document host.
//!
//! Artifact names are case-preserving for display but matched
//! case-insensitively everywhere; use [`ArtifactName::logical`] to obtain the
//! matching key.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The name of an artifact as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactName(pub String);

impl ArtifactName {
    /// Lower-cased matching key shared with file stems in a directory index.
    pub fn logical(&self) -> String {
        self.0.to_lowercase()
    }

    /// Case-insensitive comparison against a logical name or another spelling.
    pub fn matches(&self, other: &str) -> bool {
        self.logical() == other.to_lowercase()
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ArtifactName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ArtifactName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Closed set of artifact kinds a host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    #[default]
    StandardModule,
    ClassModule,
    FormModule,
    /// Bound to a structural element of the document (a sheet, the workbook).
    DocumentModule,
    Other,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::StandardModule,
        ArtifactKind::ClassModule,
        ArtifactKind::FormModule,
        ArtifactKind::DocumentModule,
        ArtifactKind::Other,
    ];

    /// Map a numeric component type code (`vbext_ComponentType`) to a kind.
    ///
    /// Unrecognized codes resolve to [`ArtifactKind::Other`].
    pub fn from_host_code(code: i32) -> Self {
        match code {
            1 => ArtifactKind::StandardModule,
            2 => ArtifactKind::ClassModule,
            3 => ArtifactKind::FormModule,
            100 => ArtifactKind::DocumentModule,
            _ => ArtifactKind::Other,
        }
    }

    /// Host-generated kinds are updated in place but never created or removed.
    pub fn is_intrinsic(self) -> bool {
        matches!(self, ArtifactKind::DocumentModule)
    }

    /// Whether a pulled file of this kind is stored without its export header.
    ///
    /// Class, form and document modules keep their header because re-import
    /// derives the kind from it.
    pub fn strips_export_header(self) -> bool {
        matches!(self, ArtifactKind::StandardModule)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::StandardModule => write!(f, "standard module"),
            ArtifactKind::ClassModule => write!(f, "class module"),
            ArtifactKind::FormModule => write!(f, "form"),
            ArtifactKind::DocumentModule => write!(f, "document module"),
            ArtifactKind::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// An artifact as listed by the host. The body stays with the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: ArtifactName,
    pub kind: ArtifactKind,
    pub intrinsic: bool,
}

impl Artifact {
    /// Build an artifact whose intrinsic flag follows its kind.
    pub fn new(name: impl Into<ArtifactName>, kind: ArtifactKind) -> Self {
        Self {
            name: name.into(),
            kind,
            intrinsic: kind.is_intrinsic(),
        }
    }
}

/// Case-insensitive lookup of an artifact in a listing.
pub fn find_artifact<'a>(artifacts: &'a [Artifact], name: &str) -> Option<&'a Artifact> {
    artifacts.iter().find(|a| a.name.matches(name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
