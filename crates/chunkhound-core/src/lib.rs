//! # chunkhound-core
//!
//! Foundation crate for the ChunkHound indexing coordinator.
//! Defines the data model, the collaborator traits external subsystems
//! (language parsers, the database provider, the embedding generator)
//! implement, configuration, errors, and progress events.

pub mod config;
pub mod errors;
pub mod events;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::IndexConfig;
pub use errors::{CoordinatorError, DiscoveryError, ParseError, StoreError};
pub use types::{Chunk, ChunkId, ChunkKind, Embedding, File, FileId, ParsedFileResult};
