//! Collaborator traits (§6) — the narrow interfaces the indexing
//! coordinator consumes without implementing. Object-safe, `Send + Sync`,
//! mirroring the teacher's `IDriftFiles`/`IDriftBatchWriter` storage-trait
//! split: one trait per responsibility rather than one god-trait.

mod cancellation;
mod embedding;
mod language_parser;
mod storage;
mod watcher;

pub use cancellation::CancellationToken;
pub use embedding::EmbeddingProvider;
pub use language_parser::LanguageParser;
pub use storage::{ChunkStore, EmbeddingStore, FileRecord, FileStore, OrphanQuery, Transactional};
pub use watcher::FileWatchEvent;
