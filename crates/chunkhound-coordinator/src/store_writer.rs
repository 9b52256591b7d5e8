//! Store writer (§4.7): one transaction per file, upsert + diff + insert/
//! delete, grounded on the teacher's per-file-transaction shape in
//! `drift-storage/src/engine.rs` (`with_writer` closures over a single
//! connection) but scoped here to the narrow `FileStore`/`ChunkStore`
//! traits rather than a concrete SQLite engine.

use crate::store::Store;
use chunkhound_core::types::{Chunk, FileId, FileStatus, ParsedFileResult};
use chunkhound_index::diff_chunks;

#[derive(Debug, Clone, Default)]
pub struct FileWriteStats {
    pub chunks_added: usize,
    pub chunks_removed: usize,
    pub error: Option<String>,
}

/// Writes one `ParsedFileResult` inside its own transaction (§4.7). The
/// File row is always upserted (carrying whatever size/mtime/content_hash
/// the caller has, which may have been refreshed by the change detector
/// even if the parse itself was skipped or errored — §4.3 item 6). Chunks
/// are only touched when the parse succeeded.
pub fn write_result(
    store: &Store,
    file_id: FileId,
    result: &ParsedFileResult,
    carried_hash: Option<&[u8]>,
) -> FileWriteStats {
    if let Err(e) = store.tx.begin_transaction() {
        return FileWriteStats {
            error: Some(e.to_string()),
            ..Default::default()
        };
    }

    let outcome = apply(store, file_id, result, carried_hash);

    match &outcome {
        Ok(_) => {
            if let Err(e) = store.tx.commit_transaction() {
                let _ = store.tx.rollback_transaction();
                return FileWriteStats {
                    error: Some(e.to_string()),
                    ..Default::default()
                };
            }
        }
        Err(_) => {
            let _ = store.tx.rollback_transaction();
        }
    }

    match outcome {
        Ok(stats) => stats,
        Err(message) => FileWriteStats {
            error: Some(message),
            ..Default::default()
        },
    }
}

fn apply(
    store: &Store,
    file_id: FileId,
    result: &ParsedFileResult,
    carried_hash: Option<&[u8]>,
) -> Result<FileWriteStats, String> {
    let hash = carried_hash.or(result.content_hash.as_deref());
    store
        .files
        .update_file(file_id, result.size, result.mtime, hash)
        .map_err(|e| e.to_string())?;

    if result.status != FileStatus::Success {
        return Ok(FileWriteStats::default());
    }

    let existing = store.chunks.get_chunks_by_file_id(file_id).map_err(|e| e.to_string())?;
    let stamped: Vec<Chunk> = result
        .chunks
        .iter()
        .cloned()
        .map(|mut c| {
            c.file_id = file_id;
            c
        })
        .collect();

    if existing.is_empty() {
        let added = stamped.len();
        if !stamped.is_empty() {
            store.chunks.insert_chunks_batch(&stamped).map_err(|e| e.to_string())?;
        }
        return Ok(FileWriteStats {
            chunks_added: added,
            chunks_removed: 0,
            error: None,
        });
    }

    let diff = diff_chunks(&existing, &stamped);
    for deleted in &diff.deleted {
        if let Some(id) = deleted.id {
            store.chunks.delete_chunk(id).map_err(|e| e.to_string())?;
        }
    }
    if !diff.added.is_empty() {
        store.chunks.insert_chunks_batch(&diff.added).map_err(|e| e.to_string())?;
    }

    Ok(FileWriteStats {
        chunks_added: diff.added.len(),
        chunks_removed: diff.deleted.len(),
        error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use chunkhound_core::testing::InMemoryStore;
    use chunkhound_core::traits::{ChunkStore, FileStore};
    use chunkhound_core::types::{ChunkKind, File, Language};
    use std::path::PathBuf;

    fn store_bundle(store: &InMemoryStore) -> Store {
        Store {
            files: store,
            chunks: store,
            embeddings: store,
            tx: store,
            query: store,
        }
    }

    fn chunk(symbol: &str, code: &str, file_id: FileId) -> Chunk {
        Chunk {
            id: None,
            file_id,
            symbol: symbol.to_string(),
            kind: ChunkKind::Function,
            start_line: 1,
            end_line: 1,
            start_byte: 0,
            end_byte: code.len() as u32,
            code: code.to_string(),
            language: Language::Python,
            parent: None,
            content_hash: Chunk::content_hash_of(code),
        }
    }

    #[test]
    fn first_write_inserts_whole_chunk_set() {
        let backing = InMemoryStore::new();
        let store = store_bundle(&backing);
        let file_id = backing.insert_file(&File::new("a.py", 18, 1.0)).unwrap();

        let result = ParsedFileResult::success(
            PathBuf::from("a.py"),
            Language::Python,
            vec![chunk("f", "def f(): return 1", file_id)],
            18,
            1.0,
        );
        let stats = write_result(&store, file_id, &result, None);
        assert_eq!(stats.chunks_added, 1);
        assert_eq!(stats.chunks_removed, 0);
        assert!(stats.error.is_none());
        assert_eq!(backing.total_chunks(), 1);
    }

    #[test]
    fn reparse_preserves_unchanged_chunk_and_diffs_changed_one() {
        // S3
        let backing = InMemoryStore::new();
        let store = store_bundle(&backing);
        let file_id = backing.insert_file(&File::new("a.py", 10, 1.0)).unwrap();

        let first = ParsedFileResult::success(
            PathBuf::from("a.py"),
            Language::Python,
            vec![
                chunk("f", "def f(): return 1", file_id),
                chunk("g", "def g(): return 2", file_id),
            ],
            10,
            1.0,
        );
        write_result(&store, file_id, &first, None);
        let f_id_before = backing
            .get_chunks_by_file_id(file_id)
            .unwrap()
            .iter()
            .find(|c| c.symbol == "f")
            .unwrap()
            .id;

        let second = ParsedFileResult::success(
            PathBuf::from("a.py"),
            Language::Python,
            vec![
                chunk("f", "def f(): return 1", file_id),
                chunk("g", "def g(): return 3", file_id),
            ],
            10,
            2.0,
        );
        let stats = write_result(&store, file_id, &second, None);
        assert_eq!(stats.chunks_added, 1);
        assert_eq!(stats.chunks_removed, 1);

        let after = backing.get_chunks_by_file_id(file_id).unwrap();
        let f_after = after.iter().find(|c| c.symbol == "f").unwrap();
        assert_eq!(f_after.id, f_id_before);
    }

    #[test]
    fn skipped_result_still_updates_file_metadata_but_touches_no_chunks() {
        let backing = InMemoryStore::new();
        let store = store_bundle(&backing);
        let file_id = backing.insert_file(&File::new("big.json", 100, 1.0)).unwrap();
        let result = ParsedFileResult::skipped(PathBuf::from("big.json"), 30_000, 2.0, "large_config_file");
        let stats = write_result(&store, file_id, &result, Some(&[1, 2, 3]));
        assert!(stats.error.is_none());
        assert_eq!(stats.chunks_added, 0);
        let file = backing.get_file_by_path("big.json").unwrap().unwrap();
        assert_eq!(file.size, 30_000);
        assert_eq!(file.content_hash, Some(vec![1, 2, 3]));
    }
}
