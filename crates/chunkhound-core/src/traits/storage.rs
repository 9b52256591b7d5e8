//! The database-provider collaborator (§6), split into narrow traits the
//! way the teacher splits `IDriftFiles`/`IDriftBatchWriter`/`IDriftReader`
//! rather than one god-trait. A concrete provider (SQLite, Postgres, ...)
//! implements all of them; the coordinator only ever depends on the traits.

use crate::errors::StoreError;
use crate::types::{Chunk, ChunkId, Embedding, File, FileId};

/// A `File` row as returned by the provider, decoupled from the indexer's
/// own `File` struct so providers that store extra columns don't need to
/// shape their query results around it.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: FileId,
    pub path: String,
    pub size: u64,
    /// Epoch seconds, or a provider timestamp already converted to one
    /// (§6: "either an epoch float or a timestamp convertible to one").
    pub mtime: f64,
    pub content_hash: Option<Vec<u8>>,
}

/// Transaction control (§6). One transaction per file (§4.7).
pub trait Transactional: Send + Sync {
    fn begin_transaction(&self) -> Result<(), StoreError>;
    fn commit_transaction(&self) -> Result<(), StoreError>;
    fn rollback_transaction(&self) -> Result<(), StoreError>;
}

/// File metadata CRUD (§6).
pub trait FileStore: Send + Sync {
    fn get_file_by_path(&self, path: &str) -> Result<Option<FileRecord>, StoreError>;
    fn insert_file(&self, file: &File) -> Result<FileId, StoreError>;
    /// Providers that don't carry `content_hash` must silently ignore it
    /// rather than erroring (§6).
    fn update_file(&self, id: FileId, size: u64, mtime: f64, content_hash: Option<&[u8]>) -> Result<(), StoreError>;
    fn delete_file_completely(&self, path: &str) -> Result<bool, StoreError>;
    fn all_paths(&self) -> Result<Vec<String>, StoreError>;

    /// Whether this provider can persist `content_hash` at all — the
    /// change detector degrades to skipping verification when it can't
    /// (§4.3 item 5). Defaults to `true`.
    fn supports_content_hash(&self) -> bool {
        true
    }
}

/// Chunk CRUD (§6).
pub trait ChunkStore: Send + Sync {
    fn get_chunks_by_file_id(&self, file_id: FileId) -> Result<Vec<Chunk>, StoreError>;
    fn insert_chunks_batch(&self, chunks: &[Chunk]) -> Result<Vec<ChunkId>, StoreError>;
    fn delete_chunk(&self, id: ChunkId) -> Result<(), StoreError>;
}

/// Embedding storage, exclusively owned by the embedding collaborator (§3
/// "Ownership") — the coordinator never writes to this table itself, it
/// only reads via `chunks_missing_embeddings` to answer the read-only
/// `missing_embeddings` query; the embedding collaborator performs the
/// inserts itself.
pub trait EmbeddingStore: Send + Sync {
    fn insert_embeddings_batch(&self, rows: &[Embedding]) -> Result<(), StoreError>;
    fn chunks_missing_embeddings(&self, provider: &str, model: &str) -> Result<Vec<ChunkId>, StoreError>;
}

/// Escape hatch used only by orphan reconciliation (§4.8, §6) and an
/// optional post-run optimization hook (§4.7).
pub trait OrphanQuery: Send + Sync {
    fn execute_query(&self, sql: &str, params: &[&str]) -> Result<Vec<Vec<String>>, StoreError>;
    fn optimize_tables(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
