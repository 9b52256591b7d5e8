//! Test doubles for every collaborator trait, grounded on the cortex
//! `test-fixtures` pattern of implementing a collaborator trait directly as
//! a small struct local to the tests that need it (e.g. its
//! `LifecycleEmbedder: IEmbeddingProvider` using a content hash as a fake
//! vector). Gated behind `testing` so production builds never link this in.

mod store;

pub use store::InMemoryStore;

use crate::errors::ParseError;
use crate::traits::{EmbeddingProvider, LanguageParser};
use crate::traits::embedding::EmbeddingResult;
use crate::types::{Chunk, ChunkId, ChunkKind, FileId};
use std::path::Path;

/// Splits source into one `Block` chunk per non-empty line — enough shape
/// to exercise discovery/change-detection/diff logic without depending on
/// a real tree-sitter grammar, which is an external collaborator (§1, §6).
pub struct LineChunkParser {
    kinds: Vec<ChunkKind>,
}

impl Default for LineChunkParser {
    fn default() -> Self {
        Self {
            kinds: vec![ChunkKind::Block],
        }
    }
}

impl LanguageParser for LineChunkParser {
    fn parse_file(&self, _path: &Path, source: &[u8], file_id: FileId) -> Result<Vec<Chunk>, ParseError> {
        let text = String::from_utf8_lossy(source);
        let chunks = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                let line_no = (i + 1) as u32;
                Chunk {
                    id: None,
                    file_id,
                    symbol: format!("line{line_no}"),
                    kind: ChunkKind::Block,
                    start_line: line_no,
                    end_line: line_no,
                    start_byte: 0,
                    end_byte: line.len() as u32,
                    code: line.to_string(),
                    language: crate::types::Language::PlainText,
                    parent: None,
                    content_hash: Chunk::content_hash_of(line),
                }
            })
            .collect();
        Ok(chunks)
    }

    fn supported_chunk_types(&self) -> &[ChunkKind] {
        &self.kinds
    }
}

/// A deterministic fake embedder: the "vector" is the chunk text's CRC32
/// spread across `dims` floats. Lets tests assert embeddings survive a
/// re-parse without depending on a real model.
pub struct HashEmbeddingProvider {
    dims: u32,
}

impl HashEmbeddingProvider {
    pub fn new(dims: u32) -> Self {
        Self { dims }
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed_batch(&self, inputs: &[(ChunkId, String)]) -> Vec<EmbeddingResult> {
        inputs
            .iter()
            .map(|(id, text)| {
                let hash = crc32fast::hash(text.as_bytes());
                let vector = (0..self.dims)
                    .map(|i| ((hash.rotate_left(i)) % 1000) as f32 / 1000.0)
                    .collect();
                EmbeddingResult {
                    chunk_id: *id,
                    vector,
                }
            })
            .collect()
    }

    fn provider_name(&self) -> &str {
        "test-hash"
    }

    fn model_name(&self) -> &str {
        "crc32-spread"
    }

    fn dims(&self) -> u32 {
        self.dims
    }
}
