//! Raw notify events → file events the dispatcher acts on.

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};

use vbasync_sync::PushScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Created,
    Modified,
    Deleted,
}

/// A change to one file under the watched tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub kind: FileEventKind,
    pub path: PathBuf,
}

impl FileEvent {
    pub fn new(kind: FileEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// The single-artifact push this event triggers.
    pub fn scope(&self) -> PushScope {
        match self.kind {
            FileEventKind::Created | FileEventKind::Modified => {
                PushScope::Changed(self.path.clone())
            }
            FileEventKind::Deleted => PushScope::Deleted(self.path.clone()),
        }
    }
}

/// Translate one notify event. Directory events, metadata-only changes and
/// access events produce nothing; a rename becomes a deletion of the old path
/// followed by a creation of the new one.
pub fn file_events(event: &Event) -> Vec<FileEvent> {
    let files = |kind: FileEventKind| -> Vec<FileEvent> {
        event
            .paths
            .iter()
            .filter(|path| !path.is_dir())
            .map(|path| FileEvent::new(kind, path.clone()))
            .collect()
    };

    match &event.kind {
        EventKind::Create(CreateKind::Folder) => Vec::new(),
        EventKind::Create(_) => files(FileEventKind::Created),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(ModifyKind::Name(mode)) => renamed(*mode, &event.paths),
        EventKind::Modify(_) => files(FileEventKind::Modified),
        EventKind::Remove(RemoveKind::Folder) => Vec::new(),
        EventKind::Remove(_) => event
            .paths
            .iter()
            .map(|path| FileEvent::new(FileEventKind::Deleted, path.clone()))
            .collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

fn renamed(mode: RenameMode, paths: &[PathBuf]) -> Vec<FileEvent> {
    match (mode, paths) {
        (RenameMode::Both, [from, to]) => {
            let mut events = vec![FileEvent::new(FileEventKind::Deleted, from.clone())];
            if !to.is_dir() {
                events.push(FileEvent::new(FileEventKind::Created, to.clone()));
            }
            events
        }
        (RenameMode::From, _) => paths
            .iter()
            .map(|path| FileEvent::new(FileEventKind::Deleted, path.clone()))
            .collect(),
        (RenameMode::To, _) => paths
            .iter()
            .filter(|path| !path.is_dir())
            .map(|path| FileEvent::new(FileEventKind::Created, path.clone()))
            .collect(),
        // Backends that cannot tell the two ends apart.
        _ => paths.iter().filter_map(|path| by_existence(path)).collect(),
    }
}

fn by_existence(path: &Path) -> Option<FileEvent> {
    if path.is_dir() {
        None
    } else if path.exists() {
        Some(FileEvent::new(FileEventKind::Created, path))
    } else {
        Some(FileEvent::new(FileEventKind::Deleted, path))
    }
}
