//! Parse-phase errors (§4.4, §7).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("could not stat {path}: {message}")]
    Stat { path: PathBuf, message: String },

    #[error("unsupported language for extension {extension:?}")]
    UnsupportedLanguage { extension: String },

    #[error("config file too large: {path} ({size_kb} KiB > {threshold_kb} KiB)")]
    ConfigFileTooLarge {
        path: PathBuf,
        size_kb: u64,
        threshold_kb: u64,
    },

    #[error("parse of {path} timed out after {timeout_secs:.1}s")]
    Timeout { path: PathBuf, timeout_secs: f64 },

    #[error("parser for {path} failed: {message}")]
    ParserFailed { path: PathBuf, message: String },

    #[error("isolated parse worker crashed for {path}: {message}")]
    WorkerCrashed { path: PathBuf, message: String },
}
