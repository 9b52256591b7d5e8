//! The embedding-generator collaborator (§6).

use crate::types::ChunkId;

/// Given `(chunk_id, text)` pairs with non-empty text — the coordinator
/// filters out chunks whose normalized text is empty before calling this
/// (§6) — returns one vector per input that succeeded. A provider may
/// return fewer vectors than inputs: partial-batch success is acceptable
/// (§9 Open Question), the rest are picked up by a later
/// `missing_embeddings` pass.
pub trait EmbeddingProvider: Send + Sync {
    fn embed_batch(&self, inputs: &[(ChunkId, String)]) -> Vec<EmbeddingResult>;

    fn provider_name(&self) -> &str;
    fn model_name(&self) -> &str;
    fn dims(&self) -> u32;
}

#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    pub chunk_id: ChunkId,
    pub vector: Vec<f32>,
}
