//! Coordinator-level error, aggregating the subsystem errors (§7).
//!
//! Only escapes `process_directory`/`process_file` on a fatal condition —
//! the per-file and per-subtree cases are folded into the run statistics
//! instead of propagated (§7 "Fatal errors").

use super::{DiscoveryError, ParseError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("parse scheduling failed: {0}")]
    Parse(#[from] ParseError),

    #[error("store writer failed: {0}")]
    Store(#[from] StoreError),

    #[error("indexing run was cancelled")]
    Cancelled,
}
