//! The Coordinator (§4.9): owns the phase sequence, progress reporting,
//! per-file locking, cancellation, and statistics aggregation for one base
//! directory. Grounded on the teacher's `Scanner::scan`
//! (`drift-analysis/src/scanner/scanner.rs`) — a single struct/method
//! threading configuration and collaborators through a fixed phase
//! sequence, driven from one thread, with no database access from worker
//! threads.

use crate::orphan::reconcile;
use crate::stats::{FileError, IndexStats};
use crate::store::Store;
use chunkhound_core::errors::CoordinatorError;
use chunkhound_core::events::{CoordinatorEventHandler, Phase, PhaseCompleteEvent, PhaseProgressEvent, PhaseStartedEvent, TimeoutEvent};
use chunkhound_core::traits::{CancellationToken, FileWatchEvent};
use chunkhound_core::types::{ChunkId, File, FileId, FileStatus};
use chunkhound_core::IndexConfig;
use chunkhound_discovery::{discover, DiscoveryConfig, PatternMatcher};
use chunkhound_index::parse::{parse_one, ParseWorkerConfig, ParserRegistry};
use chunkhound_index::{batch_size, decide, partition_into_batches, run_batches, sample_hash_file, worker_count, ChangeDetectorConfig, SchedulerConfig};
use rustc_hash::FxHashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::store_writer::write_result;

/// A chunk missing an embedding for a given `(provider, model)`, as
/// returned by [`Coordinator::missing_embeddings`] — enough for the
/// embedding collaborator to produce `(chunk_id, text)` inputs without
/// re-querying the chunk store itself.
#[derive(Debug, Clone)]
pub struct ChunkRef {
    pub chunk_id: ChunkId,
    pub file_path: String,
    pub symbol: String,
    pub code: String,
}

pub struct Coordinator<'a> {
    root: PathBuf,
    config: IndexConfig,
    registry: &'a dyn ParserRegistry,
    store: Store<'a>,
    events: &'a dyn CoordinatorEventHandler,
    cancel: CancellationToken,
    locks: Mutex<FxHashMap<String, Arc<Mutex<()>>>>,
}

impl<'a> Coordinator<'a> {
    pub fn new(root: PathBuf, config: IndexConfig, registry: &'a dyn ParserRegistry, store: Store<'a>, events: &'a dyn CoordinatorEventHandler) -> Self {
        Self {
            root,
            config,
            registry,
            store,
            events,
            cancel: CancellationToken::new(),
            locks: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Full pipeline (§2): discovery, orphan reconciliation, change
    /// detection, the parse/store phase streamed batch-by-batch, and a
    /// final table-optimization hook if anything changed.
    pub fn process_directory(&self) -> Result<IndexStats, CoordinatorError> {
        if self.cancel.is_cancelled() {
            return Err(CoordinatorError::Cancelled);
        }
        let mut stats = IndexStats::default();
        let mut changed_any = false;

        self.events.on_phase_started(&PhaseStartedEvent {
            phase: Phase::Discovery,
            total: None,
        });
        let discovery_cfg = DiscoveryConfig {
            include: &self.config.include,
            exclude: &self.config.exclude,
            parallel_discovery: self.config.parallel_discovery,
            min_dirs_for_parallel: self.config.min_dirs_for_parallel,
            max_discovery_workers: self.config.max_discovery_workers,
            use_inode_ordering: self.config.use_inode_ordering,
        };
        let report = discover(&self.root, &discovery_cfg, self.cancel.as_atomic());
        self.events.on_phase_complete(&PhaseCompleteEvent {
            phase: Phase::Discovery,
            duration_ms: 0,
        });
        for err in &report.subtree_errors {
            tracing::warn!(path = %err.path, message = %err.message, "discovery subtree error");
        }

        // §4.8: orphan reconciliation runs right after discovery, before
        // any parsing, using the just-discovered path set.
        if self.config.cleanup {
            self.events.on_phase_started(&PhaseStartedEvent {
                phase: Phase::OrphanCleanup,
                total: None,
            });
            let discovered_paths: Vec<String> = report.files.iter().map(|f| f.path.clone()).collect();
            let matcher = PatternMatcher::new();
            let reconcile_stats = reconcile(&self.store, &discovered_paths, &self.config.exclude, &matcher)?;
            for (path, err) in &reconcile_stats.failures {
                tracing::warn!(path = %path, error = %err, "orphan cleanup failed");
            }
            changed_any |= reconcile_stats.removed > 0;
            self.events.on_phase_complete(&PhaseCompleteEvent {
                phase: Phase::OrphanCleanup,
                duration_ms: 0,
            });
        }

        if self.cancel.is_cancelled() {
            return Err(CoordinatorError::Cancelled);
        }

        self.events.on_phase_started(&PhaseStartedEvent {
            phase: Phase::ChangeScan,
            total: Some(report.files.len()),
        });
        let change_cfg = ChangeDetectorConfig {
            force_reindex: self.config.force_reindex,
            mtime_epsilon_seconds: self.config.mtime_epsilon_seconds,
            verify_checksum_when_mtime_equal: self.config.verify_checksum_when_mtime_equal,
            checksum_sample_kb: self.config.checksum_sample_kb,
        };
        let supports_hash = self.store.files.supports_content_hash();

        let mut to_parse: Vec<(PathBuf, FileId)> = Vec::new();
        let mut carried_hashes: FxHashMap<FileId, Vec<u8>> = FxHashMap::default();

        for discovered in &report.files {
            if self.cancel.is_cancelled() {
                break;
            }
            let existing = self.store.files.get_file_by_path(&discovered.path)?;
            let file_id = match &existing {
                Some(record) => record.id,
                None => self
                    .store
                    .files
                    .insert_file(&File::new(discovered.path.clone(), discovered.size, discovered.mtime))?,
            };

            let abs_path = self.root.join(&discovered.path);
            let decision = decide(
                existing.as_ref(),
                discovered.size,
                discovered.mtime,
                supports_hash,
                &abs_path,
                &change_cfg,
                |p, kb| sample_hash_file(p, kb),
            );

            if decision.needs_parse() {
                if let Some(hash) = decision.carried_hash() {
                    carried_hashes.insert(file_id, hash.to_vec());
                }
                to_parse.push((abs_path, file_id));
            } else {
                stats.skipped_unchanged += 1;
            }
        }
        self.events.on_phase_complete(&PhaseCompleteEvent {
            phase: Phase::ChangeScan,
            duration_ms: 0,
        });

        if !to_parse.is_empty() && !self.cancel.is_cancelled() {
            self.events.on_phase_started(&PhaseStartedEvent {
                phase: Phase::Parse,
                total: Some(to_parse.len()),
            });

            let cpu_count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
            let sched_cfg = SchedulerConfig {
                timeouts_enabled: self.config.timeouts_enabled(),
                max_concurrent: self.config.max_concurrent,
                per_file_timeout_seconds: self.config.per_file_timeout_seconds,
            };
            let workers = worker_count(&sched_cfg, to_parse.len(), cpu_count);
            let size = batch_size(to_parse.len(), workers, &sched_cfg);
            let batches = partition_into_batches(to_parse, size);
            let batch_files: Vec<Vec<(PathBuf, FileId)>> = batches.iter().map(|b| b.files.clone()).collect();

            let parse_cfg = ParseWorkerConfig {
                per_file_timeout_seconds: self.config.per_file_timeout_seconds,
                per_file_timeout_min_size_kb: self.config.per_file_timeout_min_size_kb,
                config_file_size_threshold_kb: self.config.config_file_size_threshold_kb,
            };

            let total_to_store = batch_files.iter().map(|b| b.len()).sum();
            self.events.on_phase_started(&PhaseStartedEvent {
                phase: Phase::Store,
                total: Some(total_to_store),
            });

            let mut write_errors: Vec<FileError> = Vec::new();
            let mut stored = 0usize;
            run_batches(batches, workers, self.registry, &parse_cfg, self.cancel.as_atomic(), |index, results| {
                let files = &batch_files[index];
                for (result, (path, file_id)) in results.iter().zip(files.iter()) {
                    match result.status {
                        FileStatus::Success => {
                            stats.files_processed += 1;
                            stats.total_chunks += result.chunks.len();
                        }
                        FileStatus::Skipped => match result.reason.as_deref() {
                            Some("timeout") => {
                                stats.skipped_due_to_timeout += 1;
                                self.events.on_timeout(&TimeoutEvent {
                                    path: path.clone(),
                                    timeout_secs: self.config.per_file_timeout_seconds,
                                });
                            }
                            Some("large_config_file") => stats.skipped_filtered += 1,
                            _ => stats.skipped += 1,
                        },
                        FileStatus::Error => stats.errors.push(FileError {
                            path: path.clone(),
                            message: result.reason.clone().unwrap_or_default(),
                        }),
                    }

                    let carried = carried_hashes.get(file_id).map(|v| v.as_slice());
                    let write_stats = write_result(&self.store, *file_id, result, carried);
                    if let Some(message) = write_stats.error {
                        write_errors.push(FileError { path: path.clone(), message });
                    }

                    stored += 1;
                    self.events.on_phase_progress(&PhaseProgressEvent {
                        phase: Phase::Store,
                        processed: stored,
                        total: total_to_store,
                    });
                }
            });
            self.events.on_phase_complete(&PhaseCompleteEvent {
                phase: Phase::Parse,
                duration_ms: 0,
            });
            self.events.on_phase_complete(&PhaseCompleteEvent {
                phase: Phase::Store,
                duration_ms: 0,
            });

            stats.errors.extend(write_errors);
            changed_any |= stats.files_processed > 0;
        }

        if changed_any {
            self.store.query.optimize_tables()?;
        }

        Ok(stats)
    }

    /// Single-file driver for the file-watcher collaborator (§2, §5), under
    /// a per-path lock so at most one writer touches this path at a time.
    pub fn process_file(&self, path: &Path) -> Result<IndexStats, CoordinatorError> {
        let rel = self.relative_path(path);
        let path_lock = self.lock_for(&rel);
        let _guard = path_lock.lock().unwrap();

        let mut stats = IndexStats::default();
        let Ok(metadata) = path.metadata() else {
            return Ok(stats);
        };
        let size = metadata.len();
        let mtime = mtime_of(&metadata);

        let existing = self.store.files.get_file_by_path(&rel)?;
        let file_id = match &existing {
            Some(record) => record.id,
            None => self.store.files.insert_file(&File::new(rel.clone(), size, mtime))?,
        };

        let change_cfg = ChangeDetectorConfig {
            force_reindex: self.config.force_reindex,
            mtime_epsilon_seconds: self.config.mtime_epsilon_seconds,
            verify_checksum_when_mtime_equal: self.config.verify_checksum_when_mtime_equal,
            checksum_sample_kb: self.config.checksum_sample_kb,
        };
        let decision = decide(
            existing.as_ref(),
            size,
            mtime,
            self.store.files.supports_content_hash(),
            path,
            &change_cfg,
            |p, kb| sample_hash_file(p, kb),
        );

        if !decision.needs_parse() {
            stats.skipped_unchanged += 1;
            return Ok(stats);
        }
        let carried = decision.carried_hash().map(|h| h.to_vec());

        let parse_cfg = ParseWorkerConfig {
            per_file_timeout_seconds: self.config.per_file_timeout_seconds,
            per_file_timeout_min_size_kb: self.config.per_file_timeout_min_size_kb,
            config_file_size_threshold_kb: self.config.config_file_size_threshold_kb,
        };
        let result = parse_one(path, file_id, self.registry, &parse_cfg);

        match result.status {
            FileStatus::Success => {
                stats.files_processed += 1;
                stats.total_chunks += result.chunks.len();
            }
            FileStatus::Skipped => match result.reason.as_deref() {
                Some("timeout") => {
                    stats.skipped_due_to_timeout += 1;
                    self.events.on_timeout(&TimeoutEvent {
                        path: path.to_path_buf(),
                        timeout_secs: self.config.per_file_timeout_seconds,
                    });
                }
                Some("large_config_file") => stats.skipped_filtered += 1,
                _ => stats.skipped += 1,
            },
            FileStatus::Error => stats.errors.push(FileError {
                path: path.to_path_buf(),
                message: result.reason.clone().unwrap_or_default(),
            }),
        }

        let write_stats = write_result(&self.store, file_id, &result, carried.as_deref());
        if let Some(message) = write_stats.error {
            stats.errors.push(FileError {
                path: path.to_path_buf(),
                message,
            });
        }

        if stats.files_processed > 0 {
            self.store.query.optimize_tables()?;
        }

        Ok(stats)
    }

    /// Routes a delete event to `delete_file_completely` (§6).
    pub fn remove_file(&self, path: &Path) -> Result<(), CoordinatorError> {
        let rel = self.relative_path(path);
        let path_lock = self.lock_for(&rel);
        let _guard = path_lock.lock().unwrap();
        self.store.files.delete_file_completely(&rel)?;
        Ok(())
    }

    pub fn process_file_event(&self, event: &FileWatchEvent) -> Result<IndexStats, CoordinatorError> {
        match event {
            FileWatchEvent::Created(p) | FileWatchEvent::Modified(p) => self.process_file(p),
            FileWatchEvent::Deleted(p) => {
                self.remove_file(p)?;
                Ok(IndexStats::default())
            }
        }
    }

    /// Read-only query against the chunk/embedding tables for chunks that
    /// don't yet have an embedding from `(provider, model)` (§9 Open
    /// Question, supplemented in SPEC_FULL.md §2). The coordinator never
    /// calls the embedding collaborator itself — per §3's ownership rule
    /// it exclusively owns the `Embedding` table — so this is read-only:
    /// the caller uses the result to build `embed_batch` input and insert
    /// the result on its own.
    pub fn missing_embeddings(&self, provider: &str, model: &str) -> Result<Vec<ChunkRef>, CoordinatorError> {
        let missing_ids: HashSet<ChunkId> = self.store.embeddings.chunks_missing_embeddings(provider, model)?.into_iter().collect();
        if missing_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for path in self.store.files.all_paths()? {
            let Some(record) = self.store.files.get_file_by_path(&path)? else {
                continue;
            };
            for chunk in self.store.chunks.get_chunks_by_file_id(record.id)? {
                if let Some(id) = chunk.id {
                    if missing_ids.contains(&id) {
                        out.push(ChunkRef {
                            chunk_id: id,
                            file_path: path.clone(),
                            symbol: chunk.symbol,
                            code: chunk.code,
                        });
                    }
                }
            }
        }
        Ok(out)
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut table = self.locks.lock().unwrap();
        table.entry(key.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Relative path computation, resolving both sides to their real path
    /// first so symlinked roots (common for temp directories) don't break
    /// the subtraction (§9 "Symlink-safe base path").
    fn relative_path(&self, path: &Path) -> String {
        let root_canon = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        let path_canon = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        path_canon.strip_prefix(&root_canon).unwrap_or(&path_canon).to_string_lossy().replace('\\', "/")
    }
}

fn mtime_of(metadata: &std::fs::Metadata) -> f64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkhound_core::events::NoopEventHandler;
    use chunkhound_core::testing::{InMemoryStore, LineChunkParser};
    use chunkhound_core::traits::EmbeddingStore;
    use chunkhound_core::types::Embedding;
    use chunkhound_core::types::Language;
    use chunkhound_index::parse::MapParserRegistry;

    fn registry() -> MapParserRegistry {
        let mut reg = MapParserRegistry::new();
        reg.register(Language::Python, Box::new(LineChunkParser::default()));
        reg
    }

    fn bundle(store: &InMemoryStore) -> Store {
        Store {
            files: store,
            chunks: store,
            embeddings: store,
            tx: store,
            query: store,
        }
    }

    #[test]
    fn cold_index_of_one_file() {
        // S1
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "def f(): return 1\n").unwrap();

        let backing = InMemoryStore::new();
        let store = bundle(&backing);
        let reg = registry();
        let events = NoopEventHandler;
        let coordinator = Coordinator::new(dir.path().to_path_buf(), IndexConfig::default(), &reg, store, &events);

        let stats = coordinator.process_directory().unwrap();
        assert_eq!(stats.files_processed, 1);
        assert_eq!(backing.total_chunks(), 1);
    }

    #[test]
    fn rerun_with_no_changes_is_idempotent() {
        // S2, §8 item 1
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "def f(): return 1\n").unwrap();

        let backing = InMemoryStore::new();
        let reg = registry();
        let events = NoopEventHandler;

        {
            let store = bundle(&backing);
            let coordinator = Coordinator::new(dir.path().to_path_buf(), IndexConfig::default(), &reg, store, &events);
            coordinator.process_directory().unwrap();
        }

        let store = bundle(&backing);
        let coordinator = Coordinator::new(dir.path().to_path_buf(), IndexConfig::default(), &reg, store, &events);
        let stats = coordinator.process_directory().unwrap();

        assert_eq!(stats.files_processed, 0);
        assert_eq!(stats.skipped_unchanged, 1);
        assert_eq!(backing.total_chunks(), 1);
    }

    #[test]
    fn orphan_removal_deletes_missing_file_on_reindex() {
        // S4
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "def f(): return 1\n").unwrap();
        std::fs::write(dir.path().join("b.py"), "def g(): return 2\n").unwrap();

        let backing = InMemoryStore::new();
        let reg = registry();
        let events = NoopEventHandler;

        {
            let store = bundle(&backing);
            let coordinator = Coordinator::new(dir.path().to_path_buf(), IndexConfig::default(), &reg, store, &events);
            coordinator.process_directory().unwrap();
        }
        assert_eq!(backing.file_count(), 2);

        std::fs::remove_file(dir.path().join("b.py")).unwrap();

        let store = bundle(&backing);
        let coordinator = Coordinator::new(dir.path().to_path_buf(), IndexConfig::default(), &reg, store, &events);
        coordinator.process_directory().unwrap();

        assert_eq!(backing.file_count(), 1);
        assert_eq!(backing.total_chunks(), 1);
    }

    #[test]
    fn missing_embeddings_reports_unembedded_chunks_and_clears_after_insert() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.py"), "def f(): return 1\n").unwrap();

        let backing = InMemoryStore::new();
        let reg = registry();
        let events = NoopEventHandler;
        let store = bundle(&backing);
        let coordinator = Coordinator::new(dir.path().to_path_buf(), IndexConfig::default(), &reg, store, &events);
        coordinator.process_directory().unwrap();

        let missing = coordinator.missing_embeddings("test-hash", "crc32-spread").unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].file_path, "a.py");

        // The coordinator never inserts embeddings itself (§3 ownership) —
        // simulate the embedding collaborator doing so out-of-band.
        backing
            .insert_embeddings_batch(&[Embedding {
                chunk_id: missing[0].chunk_id,
                provider: "test-hash".into(),
                model: "crc32-spread".into(),
                dims: 4,
                vector: vec![0.1, 0.2, 0.3, 0.4],
            }])
            .unwrap();

        let again = coordinator.missing_embeddings("test-hash", "crc32-spread").unwrap();
        assert!(again.is_empty());
    }
}
