//! A bundle of the storage collaborator traits (§6), grouped for
//! ergonomic passing through the coordinator and store writer without
//! collapsing them back into one god-trait.

use chunkhound_core::traits::{ChunkStore, EmbeddingStore, FileStore, OrphanQuery, Transactional};

pub struct Store<'a> {
    pub files: &'a dyn FileStore,
    pub chunks: &'a dyn ChunkStore,
    pub embeddings: &'a dyn EmbeddingStore,
    pub tx: &'a dyn Transactional,
    pub query: &'a dyn OrphanQuery,
}
