//! The `Embedding` entity (§3).

use super::ChunkId;

/// A vector produced by the embedding collaborator for one chunk.
/// Unique per `(chunk_id, provider, model)`; a chunk may have zero or more.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub chunk_id: ChunkId,
    pub provider: String,
    pub model: String,
    pub dims: u32,
    pub vector: Vec<f32>,
}
