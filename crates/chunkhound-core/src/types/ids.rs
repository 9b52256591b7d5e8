//! Integer identifiers — chunks reference files by id, not by object
//! reference, so the differ and the cross-process parse pipeline can work
//! on plain, serializable data (§9 "Arenas, not pointer graphs").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(pub i64);

impl From<i64> for FileId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

impl From<i64> for ChunkId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}
