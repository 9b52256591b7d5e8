//! The `Chunk` entity (§3).

use super::{ChunkId, FileId, Language};
use serde::{Deserialize, Serialize};

/// A tagged variant over the closed set of chunk shapes a language parser
/// can emit (§9 "Tagged variants over inheritance"). The coordinator never
/// interprets these beyond passing them through (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkKind {
    Function,
    Method,
    Class,
    Interface,
    Enum,
    TypeAlias,
    Block,
    Paragraph,
    Script,
    Comment,
}

/// A semantic region of a source file, the unit of search and embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: Option<ChunkId>,
    pub file_id: FileId,
    pub symbol: String,
    pub kind: ChunkKind,
    pub start_line: u32,
    pub end_line: u32,
    pub start_byte: u32,
    pub end_byte: u32,
    pub code: String,
    pub language: Language,
    pub parent: Option<String>,
    /// CRC32 of the normalized `code` (§4.6), stored as a signed integer —
    /// computed lazily via `content_hash()`, not carried by the parser.
    pub content_hash: i32,
}

impl Chunk {
    /// Normalize chunk text per §4.6: strip leading/trailing whitespace,
    /// collapse internal whitespace runs to a single space, Unix line
    /// endings.
    pub fn normalize(code: &str) -> String {
        let unix = code.replace("\r\n", "\n").replace('\r', "\n");
        let mut out = String::with_capacity(unix.len());
        let mut last_was_space = false;
        for ch in unix.trim().chars() {
            if ch.is_whitespace() {
                if !last_was_space {
                    out.push(' ');
                    last_was_space = true;
                }
            } else {
                out.push(ch);
                last_was_space = false;
            }
        }
        out
    }

    /// CRC32 of the normalized code, as a signed 32-bit integer (§4.6).
    pub fn content_hash_of(code: &str) -> i32 {
        crc32fast::hash(Self::normalize(code).as_bytes()) as i32
    }
}
