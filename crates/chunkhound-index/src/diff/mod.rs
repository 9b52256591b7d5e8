//! Chunk differ (§4.6, §8 item 4): content-hash diff of a file's new chunk
//! set against its existing rows, preserving embeddings for anything whose
//! hash survived. Grouping is multiset-aware — a file with two textually
//! identical chunks keeps the diff minimal instead of treating every
//! instance of a repeated hash as interchangeable with the others.

use chunkhound_core::types::Chunk;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkDiff {
    /// Existing rows (carrying their ids) whose content hash reappeared in
    /// the new set — left untouched, embeddings intact.
    pub unchanged: Vec<Chunk>,
    /// New chunks (no id yet) with no matching hash among the existing
    /// rows — must be inserted and (later) embedded.
    pub added: Vec<Chunk>,
    /// Existing rows (carrying their ids) with no matching hash among the
    /// new set — must be deleted, cascading to their embeddings.
    pub deleted: Vec<Chunk>,
}

/// Diff `new` against `existing` for one file (§4.6). Both slices are
/// expected to belong to the same `file_id`; the caller (the store writer)
/// is responsible for scoping them.
pub fn diff_chunks(existing: &[Chunk], new: &[Chunk]) -> ChunkDiff {
    let mut by_hash: HashMap<i32, VecDeque<Chunk>> = HashMap::new();
    for chunk in existing {
        by_hash.entry(chunk.content_hash).or_default().push_back(chunk.clone());
    }

    let mut unchanged = Vec::new();
    let mut added = Vec::new();
    for chunk in new {
        match by_hash.get_mut(&chunk.content_hash).and_then(VecDeque::pop_front) {
            Some(old) => unchanged.push(old),
            None => added.push(chunk.clone()),
        }
    }

    let deleted = by_hash.into_values().flatten().collect();
    ChunkDiff { unchanged, added, deleted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkhound_core::types::{ChunkId, ChunkKind, FileId, Language};

    fn chunk(id: Option<i64>, hash: i32, symbol: &str) -> Chunk {
        Chunk {
            id: id.map(ChunkId),
            file_id: FileId(1),
            symbol: symbol.to_string(),
            kind: ChunkKind::Function,
            start_line: 1,
            end_line: 1,
            start_byte: 0,
            end_byte: 1,
            code: symbol.to_string(),
            language: Language::Python,
            parent: None,
            content_hash: hash,
        }
    }

    #[test]
    fn identical_chunk_set_is_entirely_unchanged() {
        let old = vec![chunk(Some(1), 10, "f"), chunk(Some(2), 20, "g")];
        let new = vec![chunk(None, 10, "f"), chunk(None, 20, "g")];
        let diff = diff_chunks(&old, &new);
        assert_eq!(diff.unchanged.len(), 2);
        assert!(diff.added.is_empty());
        assert!(diff.deleted.is_empty());
    }

    #[test]
    fn edited_chunk_is_delete_plus_insert() {
        // S3: `f` unchanged, `g`'s body changes (different hash).
        let old = vec![chunk(Some(1), 10, "f"), chunk(Some(2), 20, "g")];
        let new = vec![chunk(None, 10, "f"), chunk(None, 30, "g")];
        let diff = diff_chunks(&old, &new);
        assert_eq!(diff.unchanged, vec![chunk(Some(1), 10, "f")]);
        assert_eq!(diff.added, vec![chunk(None, 30, "g")]);
        assert_eq!(diff.deleted, vec![chunk(Some(2), 20, "g")]);
    }

    #[test]
    fn duplicate_hashes_match_one_to_one() {
        let old = vec![chunk(Some(1), 10, "a"), chunk(Some(2), 10, "b")];
        let new = vec![chunk(None, 10, "c")];
        let diff = diff_chunks(&old, &new);
        assert_eq!(diff.unchanged.len(), 1);
        assert!(diff.added.is_empty());
        assert_eq!(diff.deleted.len(), 1);
    }

    #[test]
    fn no_prior_chunks_means_everything_added() {
        let new = vec![chunk(None, 10, "f")];
        let diff = diff_chunks(&[], &new);
        assert_eq!(diff.added, new);
        assert!(diff.unchanged.is_empty());
        assert!(diff.deleted.is_empty());
    }
}
