//! The `File` entity (§3).

use super::{FileId, Language};

/// A discovered, indexed source file.
///
/// `path` is always relative to the indexer's base directory with
/// forward-slash separators (§3, §6), computed by resolving both the file
/// and the base directory to real paths before subtracting so symlinked
/// temp directories don't break the relative path (§9 "Symlink-safe base
/// path").
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub id: Option<FileId>,
    pub path: String,
    pub size: u64,
    pub mtime: f64,
    pub language: Option<Language>,
    /// CRC-backed sample hash of the file's content (§4.6). `None` when the
    /// provider can't store it — providers degrade gracefully (§4.3 item 5).
    pub content_hash: Option<Vec<u8>>,
}

impl File {
    pub fn new(path: impl Into<String>, size: u64, mtime: f64) -> Self {
        Self {
            id: None,
            path: path.into(),
            size,
            mtime,
            language: None,
            content_hash: None,
        }
    }
}
