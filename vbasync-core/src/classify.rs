//! Artifact kind → on-disk location.
//!
//! ```text
//! <root>/
//!   Modules/       *.bas   standard modules
//!   ClassModules/  *.cls   class modules
//!   UserForms/     *.frm   forms
//!   Sheets/        *.cls   document modules
//!   Misc/          *.txt   anything else
//! ```

use std::path::{Path, PathBuf};

use crate::types::{ArtifactKind, ArtifactName};

/// Subdirectory and extension (with leading dot) for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub subdirectory: &'static str,
    pub extension: &'static str,
}

impl Layout {
    /// `<name><extension>`
    pub fn file_name(&self, name: &ArtifactName) -> String {
        format!("{}{}", name.0, self.extension)
    }

    /// `<root>/<subdirectory>/<name><extension>`, pure (no I/O).
    pub fn path_in(&self, root: &Path, name: &ArtifactName) -> PathBuf {
        root.join(self.subdirectory).join(self.file_name(name))
    }
}

/// Every subdirectory a pulled tree can contain.
pub const SUBDIRECTORIES: [&str; 5] = ["Modules", "ClassModules", "UserForms", "Sheets", "Misc"];

/// Look up the storage layout for `kind`.
pub fn classify(kind: ArtifactKind) -> Layout {
    let (subdirectory, extension) = match kind {
        ArtifactKind::StandardModule => ("Modules", ".bas"),
        ArtifactKind::ClassModule => ("ClassModules", ".cls"),
        ArtifactKind::FormModule => ("UserForms", ".frm"),
        ArtifactKind::DocumentModule => ("Sheets", ".cls"),
        ArtifactKind::Other => ("Misc", ".txt"),
    };
    Layout {
        subdirectory,
        extension,
    }
}

/// Layout for a raw host type code; unknown codes land in `Misc`.
pub fn classify_code(code: i32) -> Layout {
    classify(ArtifactKind::from_host_code(code))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ArtifactKind::StandardModule, "Modules", ".bas")]
    #[case(ArtifactKind::ClassModule, "ClassModules", ".cls")]
    #[case(ArtifactKind::FormModule, "UserForms", ".frm")]
    #[case(ArtifactKind::DocumentModule, "Sheets", ".cls")]
    #[case(ArtifactKind::Other, "Misc", ".txt")]
    fn kind_table(#[case] kind: ArtifactKind, #[case] subdir: &str, #[case] ext: &str) {
        let layout = classify(kind);
        assert_eq!(layout.subdirectory, subdir);
        assert_eq!(layout.extension, ext);
        assert_eq!(classify(kind), layout, "lookup must be stable");
    }

    #[rstest]
    #[case(0)]
    #[case(11)]
    #[case(99)]
    #[case(i32::MAX)]
    fn unknown_codes_fall_back_to_misc(#[case] code: i32) {
        let layout = classify_code(code);
        assert_eq!(layout.subdirectory, "Misc");
        assert_eq!(layout.extension, ".txt");
    }

    #[test]
    fn every_kind_maps_into_known_subdirectories() {
        for kind in ArtifactKind::ALL {
            assert!(SUBDIRECTORIES.contains(&classify(kind).subdirectory));
        }
    }

    #[test]
    fn path_in_joins_subdirectory_and_extension() {
        let path = classify(ArtifactKind::ClassModule)
            .path_in(Path::new("/src"), &ArtifactName::from("Invoice"));
        assert_eq!(path, PathBuf::from("/src/ClassModules/Invoice.cls"));
    }
}
