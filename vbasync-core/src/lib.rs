//! vba-sync core library: artifact types, classification, normalization and
//! the document host seam.
//!
//! - [`types`]: artifact names and kinds
//! - [`classify`]: kind → subdirectory / extension
//! - [`normalize`]: header stripping and export cleanup
//! - [`codepage`]: Windows-1252 / UTF-8 conversion
//! - [`native`]: the host's export/import text form
//! - [`host`]: [`ArtifactHost`], [`HostConnector`], [`HostSession`]
//! - [`container`]: YAML document container host
//! - [`memory`]: shared in-memory host

pub mod classify;
pub mod codepage;
pub mod container;
pub mod error;
pub mod host;
pub mod memory;
pub mod native;
pub mod normalize;
pub mod types;

pub use classify::{classify, Layout};
pub use error::{HostError, TextError};
pub use host::{ArtifactHost, HostConnector, HostSession, Ownership, SessionClose};
pub use normalize::normalize;
pub use types::{find_artifact, Artifact, ArtifactKind, ArtifactName};
