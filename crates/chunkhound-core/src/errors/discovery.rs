//! Discovery-phase errors (§4.2, §7).

use std::path::PathBuf;

/// Errors that can occur while walking a subtree.
///
/// A `DiscoveryError` never aborts the whole walk — the caller records it
/// against the subtree it came from and continues (§4.2 failure semantics).
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("subtree vanished during walk: {path}")]
    Vanished { path: PathBuf },

    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("discovery worker failed: {message}")]
    WorkerFailed { message: String },
}
