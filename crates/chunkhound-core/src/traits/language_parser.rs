//! The language-parser collaborator (§6).

use crate::errors::ParseError;
use crate::types::{Chunk, ChunkKind, FileId};
use std::path::Path;

/// One per supported language. The coordinator routes a file to the parser
/// registered for its extension and never interprets `ChunkKind` beyond
/// passing it through — the taxonomy belongs to the parser (§6, §9).
pub trait LanguageParser: Send + Sync {
    /// Parse `path`'s bytes (already read by the caller — workers never
    /// touch the database, only file bytes) into chunk records. Byte
    /// offsets and line numbers are 1-based for lines, as specified in §6.
    fn parse_file(&self, path: &Path, source: &[u8], file_id: FileId) -> Result<Vec<Chunk>, ParseError>;

    /// The closed set of `ChunkKind`s this parser can emit — used by
    /// callers that want to validate a parser's output without depending on
    /// its internals.
    fn supported_chunk_types(&self) -> &[ChunkKind];
}
