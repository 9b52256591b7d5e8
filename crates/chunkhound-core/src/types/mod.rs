//! Core data model (§3).

mod chunk;
mod embedding;
mod file;
mod ids;
mod language;
mod parsed_result;

pub use chunk::{Chunk, ChunkKind};
pub use embedding::Embedding;
pub use file::File;
pub use ids::{ChunkId, FileId};
pub use language::{Language, LanguageClass};
pub use parsed_result::{FileStatus, ParsedFileResult};
