//! An in-memory database-provider double implementing every storage trait
//! on one struct — the shape a real SQLite/Postgres engine takes — backed
//! by a `Mutex<State>` with snapshot/restore for transaction semantics.

use crate::errors::StoreError;
use crate::traits::{ChunkStore, EmbeddingStore, FileRecord, FileStore, OrphanQuery, Transactional};
use crate::types::{Chunk, ChunkId, Embedding, File, FileId};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Default)]
struct State {
    files: HashMap<String, FileRecord>,
    chunks: HashMap<FileId, Vec<Chunk>>,
    embeddings: HashMap<ChunkId, Vec<Embedding>>,
    next_file_id: i64,
    next_chunk_id: i64,
}

pub struct InMemoryStore {
    state: Mutex<State>,
    snapshot: Mutex<Option<State>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            state: Mutex::new(State::default()),
            snapshot: Mutex::new(None),
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: total chunk rows currently stored, across all files.
    pub fn total_chunks(&self) -> usize {
        self.state.lock().unwrap().chunks.values().map(Vec::len).sum()
    }

    pub fn file_count(&self) -> usize {
        self.state.lock().unwrap().files.len()
    }

    pub fn embedding_for(&self, chunk_id: ChunkId) -> Option<Embedding> {
        self.state
            .lock()
            .unwrap()
            .embeddings
            .get(&chunk_id)
            .and_then(|v| v.first().cloned())
    }
}

impl Transactional for InMemoryStore {
    fn begin_transaction(&self) -> Result<(), StoreError> {
        let state = self.state.lock().unwrap().clone();
        *self.snapshot.lock().unwrap() = Some(state);
        Ok(())
    }

    fn commit_transaction(&self) -> Result<(), StoreError> {
        *self.snapshot.lock().unwrap() = None;
        Ok(())
    }

    fn rollback_transaction(&self) -> Result<(), StoreError> {
        if let Some(prev) = self.snapshot.lock().unwrap().take() {
            *self.state.lock().unwrap() = prev;
        }
        Ok(())
    }
}

impl FileStore for InMemoryStore {
    fn get_file_by_path(&self, path: &str) -> Result<Option<FileRecord>, StoreError> {
        Ok(self.state.lock().unwrap().files.get(path).cloned())
    }

    fn insert_file(&self, file: &File) -> Result<FileId, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.next_file_id += 1;
        let id = FileId(state.next_file_id);
        state.files.insert(
            file.path.clone(),
            FileRecord {
                id,
                path: file.path.clone(),
                size: file.size,
                mtime: file.mtime,
                content_hash: file.content_hash.clone(),
            },
        );
        Ok(id)
    }

    fn update_file(&self, id: FileId, size: u64, mtime: f64, content_hash: Option<&[u8]>) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(rec) = state.files.values_mut().find(|r| r.id == id) {
            rec.size = size;
            rec.mtime = mtime;
            if let Some(hash) = content_hash {
                rec.content_hash = Some(hash.to_vec());
            }
        }
        Ok(())
    }

    fn delete_file_completely(&self, path: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let Some(rec) = state.files.remove(path) else {
            return Ok(false);
        };
        if let Some(chunks) = state.chunks.remove(&rec.id) {
            for chunk in chunks {
                if let Some(id) = chunk.id {
                    state.embeddings.remove(&id);
                }
            }
        }
        Ok(true)
    }

    fn all_paths(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.state.lock().unwrap().files.keys().cloned().collect())
    }
}

impl ChunkStore for InMemoryStore {
    fn get_chunks_by_file_id(&self, file_id: FileId) -> Result<Vec<Chunk>, StoreError> {
        Ok(self.state.lock().unwrap().chunks.get(&file_id).cloned().unwrap_or_default())
    }

    fn insert_chunks_batch(&self, chunks: &[Chunk]) -> Result<Vec<ChunkId>, StoreError> {
        let mut state = self.state.lock().unwrap();
        let mut ids = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            state.next_chunk_id += 1;
            let id = ChunkId(state.next_chunk_id);
            let mut stored = chunk.clone();
            stored.id = Some(id);
            state.chunks.entry(chunk.file_id).or_default().push(stored);
            ids.push(id);
        }
        Ok(ids)
    }

    fn delete_chunk(&self, id: ChunkId) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        for chunks in state.chunks.values_mut() {
            chunks.retain(|c| c.id != Some(id));
        }
        state.embeddings.remove(&id);
        Ok(())
    }
}

impl EmbeddingStore for InMemoryStore {
    fn insert_embeddings_batch(&self, rows: &[Embedding]) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        for row in rows {
            state.embeddings.entry(row.chunk_id).or_default().push(row.clone());
        }
        Ok(())
    }

    fn chunks_missing_embeddings(&self, _provider: &str, _model: &str) -> Result<Vec<ChunkId>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut missing = Vec::new();
        for chunks in state.chunks.values() {
            for chunk in chunks {
                if let Some(id) = chunk.id {
                    if !state.embeddings.contains_key(&id) {
                        missing.push(id);
                    }
                }
            }
        }
        Ok(missing)
    }
}

impl OrphanQuery for InMemoryStore {
    fn execute_query(&self, _sql: &str, _params: &[&str]) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(Vec::new())
    }

    fn optimize_tables(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
