//! Store-writer errors (§4.7, §7).

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("constraint violation on {path}: {message}")]
    ConstraintViolation { path: PathBuf, message: String },

    #[error("transaction aborted for {path}: {message}")]
    TransactionAborted { path: PathBuf, message: String },

    #[error("provider I/O error: {message}")]
    ProviderIo { message: String },

    #[error("orphan cleanup failed for {path}: {message}")]
    ReconcileFailed { path: PathBuf, message: String },
}
