//! `ParsedFileResult` — the transient handoff between the parse worker pool
//! and the store writer (§3).

use super::{Chunk, Language};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    Success,
    Skipped,
    Error,
}

/// One file's parse outcome, produced by a parse worker and consumed by the
/// store writer in submission order (§5 "Ordering guarantees"). Serializable
/// because an isolated parse child communicates its result back to the
/// parent over a pipe as a single JSON message (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedFileResult {
    pub path: PathBuf,
    pub language: Option<Language>,
    pub chunks: Vec<Chunk>,
    pub size: u64,
    pub mtime: f64,
    pub status: FileStatus,
    /// Populated when `status == Error` or `status == Skipped` — carries the
    /// skip/error reason, e.g. `"unknown"`, `"large_config_file"`, `"timeout"`.
    pub reason: Option<String>,
    /// Present when the change detector or the parse worker had to compute
    /// a fresh sample hash (§4.3 item 6) — written atomically with the rest
    /// of the result so the hash and the parse agree.
    pub content_hash: Option<Vec<u8>>,
}

impl ParsedFileResult {
    pub fn success(path: PathBuf, language: Language, chunks: Vec<Chunk>, size: u64, mtime: f64) -> Self {
        Self {
            path,
            language: Some(language),
            chunks,
            size,
            mtime,
            status: FileStatus::Success,
            reason: None,
            content_hash: None,
        }
    }

    pub fn skipped(path: PathBuf, size: u64, mtime: f64, reason: impl Into<String>) -> Self {
        Self {
            path,
            language: None,
            chunks: Vec::new(),
            size,
            mtime,
            status: FileStatus::Skipped,
            reason: Some(reason.into()),
            content_hash: None,
        }
    }

    /// `size`/`mtime` should be the real stat'd values whenever they're
    /// known at the call site (§3: the File row must reflect on-disk
    /// bytes even when the parse itself failed) — pass `0`/`0.0` only when
    /// the file couldn't be stat'd at all.
    pub fn error(path: PathBuf, size: u64, mtime: f64, message: impl Into<String>) -> Self {
        Self {
            path,
            language: None,
            chunks: Vec::new(),
            size,
            mtime,
            status: FileStatus::Error,
            reason: Some(message.into()),
            content_hash: None,
        }
    }

    pub fn with_content_hash(mut self, hash: Vec<u8>) -> Self {
        self.content_hash = Some(hash);
        self
    }
}
