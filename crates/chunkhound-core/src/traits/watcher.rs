//! The file-watcher collaborator (§6). The watcher itself lives outside
//! this crate; this is just the event shape it drives `process_file` with.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileWatchEvent {
    Created(PathBuf),
    Modified(PathBuf),
    Deleted(PathBuf),
}

impl FileWatchEvent {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Created(p) | Self::Modified(p) | Self::Deleted(p) => p,
        }
    }
}
