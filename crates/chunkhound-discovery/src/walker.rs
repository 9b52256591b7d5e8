//! Discovery walker (§4.2).
//!
//! Grounded on the teacher's `scanner/walker.rs` shape (dispatch via
//! `crossbeam_channel`, sort results for deterministic output) but built on
//! our own matcher/gitignore dialect instead of the `ignore` crate's engine,
//! since §4.1's three dialects and the k-way-merge requirement in §8 item 2
//! aren't expressible as an `ignore::WalkBuilder` override set.

use crate::gitignore::load_gitignore;
use crate::pattern::PatternMatcher;
use chunkhound_core::types::Language;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::UNIX_EPOCH;

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredFile {
    /// Relative to the discovery root, forward-slash separated (§3).
    pub path: String,
    pub size: u64,
    pub mtime: f64,
    pub language: Option<Language>,
}

#[derive(Debug, Clone)]
pub struct SubtreeError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    pub files: Vec<DiscoveredFile>,
    pub subtree_errors: Vec<SubtreeError>,
}

pub struct DiscoveryConfig<'a> {
    pub include: &'a [String],
    pub exclude: &'a [String],
    pub parallel_discovery: bool,
    pub min_dirs_for_parallel: usize,
    pub max_discovery_workers: usize,
    pub use_inode_ordering: bool,
}

/// Entry point: picks sequential or parallel mode per §4.2, falling back to
/// sequential if the parallel pass fails unexpectedly.
pub fn discover(root: &Path, cfg: &DiscoveryConfig, cancelled: &AtomicBool) -> DiscoveryReport {
    if cfg.parallel_discovery {
        if let Ok(top_dirs) = top_level_dirs(root, cfg) {
            if top_dirs.len() >= cfg.min_dirs_for_parallel {
                return discover_parallel(root, &top_dirs, cfg, cancelled);
            }
        }
    }
    discover_sequential(root, cfg, cancelled)
}

/// A single traversal visiting each directory once, pruning excluded
/// subtrees as early as possible and applying gitignore inheritance from
/// root to leaf.
pub fn discover_sequential(root: &Path, cfg: &DiscoveryConfig, cancelled: &AtomicBool) -> DiscoveryReport {
    let matcher = PatternMatcher::new();
    let mut report = DiscoveryReport::default();
    let mut inherited = Vec::new();
    if let Some(patterns) = load_root_gitignore(root) {
        inherited.extend(patterns);
    }
    walk_dir(root, root, "", &mut inherited.clone(), &matcher, cfg, cancelled, &mut report);
    report.files.sort_by(|a, b| a.path.cmp(&b.path));
    report
}

/// Partitions `top_dirs` across a worker pool and merges each worker's
/// already-sorted output via a k-way merge (§4.2, §8 item 2).
pub fn discover_parallel(
    root: &Path,
    top_dirs: &[PathBuf],
    cfg: &DiscoveryConfig,
    cancelled: &AtomicBool,
) -> DiscoveryReport {
    let matcher = PatternMatcher::new();
    let root_patterns = load_root_gitignore(root).unwrap_or_default();

    let available = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let worker_count = available.min(top_dirs.len()).min(cfg.max_discovery_workers.max(1)).max(1);

    let partitions = partition(top_dirs, worker_count);
    let (tx, rx) = crossbeam_channel::unbounded();

    std::thread::scope(|scope| {
        for partition in partitions {
            let tx = tx.clone();
            let root_patterns = root_patterns.clone();
            let matcher = &matcher;
            scope.spawn(move || {
                let mut local = DiscoveryReport::default();
                for dir in &partition {
                    let rel = relative_path(root, dir);
                    let mut inherited = root_patterns.clone();
                    walk_dir(root, dir, &rel, &mut inherited, matcher, cfg, cancelled, &mut local);
                }
                local.files.sort_by(|a, b| a.path.cmp(&b.path));
                let _ = tx.send(local);
            });
        }
    });
    drop(tx);

    let mut streams = Vec::new();
    let mut report = DiscoveryReport::default();

    // Root-level files are scanned by the coordinator, not dispatched to a
    // worker (§4.2).
    let mut root_files = DiscoveryReport::default();
    scan_dir_files(root, root, "", &root_patterns, &matcher, cfg, &mut root_files);
    root_files.files.sort_by(|a, b| a.path.cmp(&b.path));
    streams.push(root_files.files);
    report.subtree_errors.extend(root_files.subtree_errors);

    for worker_report in rx {
        report.subtree_errors.extend(worker_report.subtree_errors);
        streams.push(worker_report.files);
    }

    report.files = k_way_merge(streams);
    report
}

fn load_root_gitignore(root: &Path) -> Option<Vec<String>> {
    let path = root.join(".gitignore");
    if path.is_file() {
        Some(load_gitignore(&path, ""))
    } else {
        None
    }
}

/// Eligible top-level subdirectories: those that would survive
/// `excluded_dir` with no inherited patterns yet loaded (the root's own
/// `.gitignore`, if any, still applies at this stage).
fn top_level_dirs(root: &Path, cfg: &DiscoveryConfig) -> std::io::Result<Vec<PathBuf>> {
    let matcher = PatternMatcher::new();
    let root_patterns = load_root_gitignore(root).unwrap_or_default();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if matcher.excluded_dir(&name, cfg.exclude) || matcher.excluded_dir(&name, &root_patterns) {
            continue;
        }
        dirs.push(path);
    }
    dirs.sort();
    Ok(dirs)
}

fn partition(dirs: &[PathBuf], worker_count: usize) -> Vec<Vec<PathBuf>> {
    let mut partitions = vec![Vec::new(); worker_count];
    for (i, dir) in dirs.iter().enumerate() {
        partitions[i % worker_count].push(dir.clone());
    }
    partitions
}

/// Recursively visits `dir`, pruning excluded subtrees and applying
/// inherited gitignore patterns, accumulating files and errors into
/// `report`. `rel_prefix` is `dir`'s path relative to `root`.
#[allow(clippy::too_many_arguments)]
fn walk_dir(
    root: &Path,
    dir: &Path,
    rel_prefix: &str,
    inherited: &mut Vec<String>,
    matcher: &PatternMatcher,
    cfg: &DiscoveryConfig,
    cancelled: &AtomicBool,
    report: &mut DiscoveryReport,
) {
    if cancelled.load(Ordering::Relaxed) {
        return;
    }

    let gitignore_path = dir.join(".gitignore");
    let own_patterns = if gitignore_path.is_file() {
        load_gitignore(&gitignore_path, rel_prefix)
    } else {
        Vec::new()
    };
    let own_count = own_patterns.len();
    inherited.extend(own_patterns);

    let entries = match read_dir_ordered(dir, cfg.use_inode_ordering) {
        Ok(entries) => entries,
        Err(err) => {
            record_subtree_error(rel_prefix, &err, report);
            inherited.truncate(inherited.len() - own_count);
            return;
        }
    };

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let child_rel = if rel_prefix.is_empty() {
            name.clone()
        } else {
            format!("{rel_prefix}/{name}")
        };

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue, // vanished mid-walk: skip silently (§4.2)
        };

        if file_type.is_dir() {
            if matcher.excluded_dir(&child_rel, cfg.exclude) || matcher.excluded_dir(&child_rel, inherited) {
                continue;
            }
            walk_dir(root, &path, &child_rel, inherited, matcher, cfg, cancelled, report);
        } else if file_type.is_file() {
            push_if_eligible(&child_rel, &path, cfg, inherited, matcher, report);
        }
    }

    inherited.truncate(inherited.len() - own_count);
}

/// Scans only the immediate files of `dir` (no recursion) — used for the
/// root directory in parallel mode, since subdirectories are dispatched to
/// workers separately.
fn scan_dir_files(
    _root: &Path,
    dir: &Path,
    rel_prefix: &str,
    inherited: &[String],
    matcher: &PatternMatcher,
    cfg: &DiscoveryConfig,
    report: &mut DiscoveryReport,
) {
    let entries = match read_dir_ordered(dir, false) {
        Ok(entries) => entries,
        Err(err) => {
            record_subtree_error(rel_prefix, &err, report);
            return;
        }
    };
    for entry in entries {
        let Ok(file_type) = entry.file_type() else { continue };
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let child_rel = if rel_prefix.is_empty() {
            name.clone()
        } else {
            format!("{rel_prefix}/{name}")
        };
        push_if_eligible(&child_rel, &entry.path(), cfg, inherited, matcher, report);
    }
}

fn push_if_eligible(
    rel_path: &str,
    abs_path: &Path,
    cfg: &DiscoveryConfig,
    inherited: &[String],
    matcher: &PatternMatcher,
    report: &mut DiscoveryReport,
) {
    if matcher.excluded(rel_path, cfg.exclude) || matcher.excluded(rel_path, inherited) {
        return;
    }
    if !matcher.included(rel_path, cfg.include) {
        return;
    }
    let metadata = match abs_path.metadata() {
        Ok(m) => m,
        Err(_) => return, // vanished between listing and stat: skip silently
    };
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    let language = Language::from_extension(abs_path.extension().and_then(|e| e.to_str()));
    report.files.push(DiscoveredFile {
        path: rel_path.to_string(),
        size: metadata.len(),
        mtime,
        language,
    });
}

fn record_subtree_error(rel_prefix: &str, err: &std::io::Error, report: &mut DiscoveryReport) {
    // Race-condition removals are skipped silently; permission errors and
    // anything else are recorded (§4.2).
    if matches!(err.kind(), std::io::ErrorKind::NotFound) {
        return;
    }
    report.subtree_errors.push(SubtreeError {
        path: rel_prefix.to_string(),
        message: err.to_string(),
    });
}

fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Lists `dir`'s entries, optionally sorted by inode to reduce seek
/// distance on rotational storage (§4.2 "optional inode ordering"). The
/// final result is sorted regardless — this only affects descent order.
fn read_dir_ordered(dir: &Path, use_inode_ordering: bool) -> std::io::Result<Vec<DirEntry>> {
    let mut entries: Vec<DirEntry> = fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    if use_inode_ordering {
        sort_by_inode(&mut entries);
    }
    Ok(entries)
}

#[cfg(unix)]
fn sort_by_inode(entries: &mut [DirEntry]) {
    use std::os::unix::fs::MetadataExt;
    entries.sort_by_key(|e| e.metadata().map(|m| m.ino()).unwrap_or(u64::MAX));
}

#[cfg(not(unix))]
fn sort_by_inode(_entries: &mut [DirEntry]) {
    // No inode concept off Unix; descent order stays directory-listing order.
}

/// Merges `streams`, each already sorted by path, into one globally sorted
/// vector without an O(n log n) pass over the merged result (§4.2).
fn k_way_merge(streams: Vec<Vec<DiscoveredFile>>) -> Vec<DiscoveredFile> {
    use std::cmp::Reverse;
    use std::collections::BinaryHeap;

    let mut iters: Vec<_> = streams.into_iter().map(|v| v.into_iter().peekable()).collect();
    let mut heap = BinaryHeap::new();
    for (i, it) in iters.iter_mut().enumerate() {
        if let Some(item) = it.peek() {
            heap.push(Reverse((item.path.clone(), i)));
        }
    }

    let mut out = Vec::new();
    while let Some(Reverse((_, i))) = heap.pop() {
        if let Some(item) = iters[i].next() {
            out.push(item);
        }
        if let Some(next) = iters[i].peek() {
            heap.push(Reverse((next.path.clone(), i)));
        }
    }
    out
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use std::sync::atomic::AtomicBool;

    fn cfg<'a>(include: &'a [String], exclude: &'a [String]) -> DiscoveryConfig<'a> {
        DiscoveryConfig {
            include,
            exclude,
            parallel_discovery: false,
            min_dirs_for_parallel: 4,
            max_discovery_workers: 16,
            use_inode_ordering: false,
        }
    }

    proptest! {
        /// §8 item 2: discovery order is deterministic and independent of
        /// sequential vs. parallel execution, for an arbitrary set of
        /// top-level directories and file names.
        #[test]
        fn sequential_and_parallel_agree_on_arbitrary_trees(
            dir_names in prop::collection::hash_set("[a-z]{1,8}", 1..6),
            file_names in prop::collection::hash_set("[a-z]{1,8}", 1..6),
        ) {
            let root = tempfile::tempdir().unwrap();
            for d in &dir_names {
                let sub = root.path().join(d);
                fs::create_dir_all(&sub).unwrap();
                for f in &file_names {
                    fs::write(sub.join(format!("{f}.py")), "x").unwrap();
                }
            }

            let empty: Vec<String> = Vec::new();
            let sequential_cfg = cfg(&empty, &empty);
            let seq = discover_sequential(root.path(), &sequential_cfg, &AtomicBool::new(false));

            let top_dirs = top_level_dirs(root.path(), &sequential_cfg).unwrap();
            let par_cfg = DiscoveryConfig {
                include: &empty,
                exclude: &empty,
                parallel_discovery: true,
                min_dirs_for_parallel: 1,
                max_discovery_workers: 16,
                use_inode_ordering: false,
            };
            let par = discover_parallel(root.path(), &top_dirs, &par_cfg, &AtomicBool::new(false));

            prop_assert_eq!(&seq.files, &par.files);

            let mut sorted = seq.files.clone();
            sorted.sort_by(|a, b| a.path.cmp(&b.path));
            prop_assert_eq!(seq.files, sorted);

            // Running sequential discovery twice must produce byte-identical
            // output — no reliance on directory-listing order leaking through.
            let seq_again = discover_sequential(root.path(), &sequential_cfg, &AtomicBool::new(false));
            prop_assert_eq!(seq_again.files, par.files);
        }
    }
}
