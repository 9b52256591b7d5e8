//! # chunkhound-coordinator
//!
//! The top-level Coordinator (§4.9): wires discovery, change detection, the
//! parse worker pool, and the store writer into one pipeline over a single
//! base directory, plus the single-file path the file-watcher collaborator
//! drives.

pub mod coordinator;
pub mod orphan;
pub mod stats;
pub mod store;
pub mod store_writer;

pub use coordinator::{ChunkRef, Coordinator};
pub use orphan::{reconcile, ReconcileStats};
pub use stats::{FileError, IndexStats};
pub use store::Store;
pub use store_writer::{write_result, FileWriteStats};
