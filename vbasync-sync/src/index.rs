//! Directory index: logical artifact name → file on disk.
//!
//! Every regular file under the root contributes its lower-cased stem. The
//! extension is ignored; kinds only matter when exporting. The walk is
//! sorted by file name, so when two files share a stem the later one in
//! that order wins and the earlier one is kept in [`DirectoryIndex::shadowed`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A file that contributes an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub logical_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryIndex {
    entries: BTreeMap<String, PathBuf>,
    shadowed: Vec<FileEntry>,
}

impl DirectoryIndex {
    /// Scan `root` recursively. A missing or unreadable root gives an empty
    /// index; unreadable entries below it are logged and skipped.
    pub fn build(root: &Path) -> Self {
        let mut index = Self::default();
        if !root.is_dir() {
            tracing::debug!("source directory {} does not exist", root.display());
            return index;
        }
        let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

        for entry in WalkDir::new(&root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("skipping unreadable entry under {}: {err}", root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(logical_name) = Self::logical_name(entry.path()) {
                index.insert(logical_name, entry.into_path());
            }
        }
        index
    }

    /// Lower-cased file stem, the key files and artifacts are matched on.
    pub fn logical_name(path: &Path) -> Option<String> {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().to_lowercase())
    }

    fn insert(&mut self, logical_name: String, path: PathBuf) {
        if let Some(previous) = self.entries.insert(logical_name.clone(), path) {
            tracing::warn!(
                "'{logical_name}' found more than once; {} is ignored in favour of {}",
                previous.display(),
                self.entries[&logical_name].display()
            );
            self.shadowed.push(FileEntry {
                logical_name,
                path: previous,
            });
        }
    }

    pub fn get(&self, logical_name: &str) -> Option<&Path> {
        self.entries
            .get(&logical_name.to_lowercase())
            .map(PathBuf::as_path)
    }

    pub fn contains(&self, logical_name: &str) -> bool {
        self.entries.contains_key(&logical_name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in logical-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    /// Files that lost to a later file with the same logical name.
    pub fn shadowed(&self) -> &[FileEntry] {
        &self.shadowed
    }
}

impl FromIterator<(String, PathBuf)> for DirectoryIndex {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        let mut index = Self::default();
        for (name, path) in iter {
            index.insert(name.to_lowercase(), path);
        }
        index
    }
}
