//! Orphan reconciler (§4.8): removes File rows whose path is no longer
//! part of the current tree, either because discovery didn't yield them
//! or because they now match an exclude pattern.

use crate::store::Store;
use chunkhound_core::errors::StoreError;
use chunkhound_discovery::PatternMatcher;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ReconcileStats {
    pub removed: usize,
    pub failures: Vec<(String, StoreError)>,
}

/// Deletes every File row in `store` whose path isn't in `discovered_paths`
/// or matches `exclude`. A single failed delete is recorded and the next
/// orphan is attempted (§7 "Reconciler errors").
pub fn reconcile(store: &Store, discovered_paths: &[String], exclude: &[String], matcher: &PatternMatcher) -> Result<ReconcileStats, StoreError> {
    let discovered: HashSet<&str> = discovered_paths.iter().map(String::as_str).collect();
    let all_paths = store.files.all_paths()?;

    let mut stats = ReconcileStats::default();
    for path in all_paths {
        let is_orphan = !discovered.contains(path.as_str()) || matcher.excluded(&path, exclude);
        if !is_orphan {
            continue;
        }
        match store.files.delete_file_completely(&path) {
            Ok(_) => stats.removed += 1,
            Err(e) => stats.failures.push((path, e)),
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkhound_core::testing::InMemoryStore;
    use chunkhound_core::traits::FileStore;
    use chunkhound_core::types::File;

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
    fn removes_paths_absent_from_discovered_set() {
        // S4
        let backing = InMemoryStore::new();
        backing.insert_file(&File::new("a.py", 1, 1.0)).unwrap();
        backing.insert_file(&File::new("b.py", 1, 1.0)).unwrap();
        let store = bundle(&backing);

        let matcher = PatternMatcher::new();
        let stats = reconcile(&store, &["a.py".to_string()], &[], &matcher).unwrap();

        assert_eq!(stats.removed, 1);
        assert!(backing.get_file_by_path("b.py").unwrap().is_none());
        assert!(backing.get_file_by_path("a.py").unwrap().is_some());
    }

    #[test]
    fn removes_paths_matching_exclude_pattern_even_if_discovered() {
        let backing = InMemoryStore::new();
        backing.insert_file(&File::new("vendor/lib.py", 1, 1.0)).unwrap();
        let store = bundle(&backing);

        let matcher = PatternMatcher::new();
        let exclude = vec!["**/vendor/**".to_string()];
        let stats = reconcile(&store, &["vendor/lib.py".to_string()], &exclude, &matcher).unwrap();

        assert_eq!(stats.removed, 1);
        assert!(backing.get_file_by_path("vendor/lib.py").unwrap().is_none());
    }

    #[test]
    fn no_orphans_is_a_no_op() {
        let backing = InMemoryStore::new();
        backing.insert_file(&File::new("a.py", 1, 1.0)).unwrap();
        let store = bundle(&backing);

        let matcher = PatternMatcher::new();
        let stats = reconcile(&store, &["a.py".to_string()], &[], &matcher).unwrap();
        assert_eq!(stats.removed, 0);
        assert!(stats.failures.is_empty());
    }
}
