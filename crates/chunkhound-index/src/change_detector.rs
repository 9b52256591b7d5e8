//! Change detector (§4.3): the size → mtime → sample-hash decision ladder,
//! grounded on the teacher's `IncrementalAnalyzer` shape
//! (`drift-analysis/src/engine/incremental.rs`) — a small struct consulted
//! once per discovered file, here returning a richer decision than a bool
//! since the sample hash, once computed, must be carried forward to the
//! store writer rather than recomputed.

use chunkhound_core::traits::FileRecord;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct ChangeDetectorConfig {
    pub force_reindex: bool,
    pub mtime_epsilon_seconds: f64,
    pub verify_checksum_when_mtime_equal: bool,
    pub checksum_sample_kb: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeDecision {
    /// Size, mtime (and sample hash, if checked) all agree — skip.
    Unchanged,
    /// A reason to parse was found before any sample hash needed computing.
    Changed,
    /// The sample hash had to be computed to decide; `sample_hash` must be
    /// carried forward and written atomically with the parse result
    /// regardless of whether it matched (§4.3 item 6).
    ChangedWithHash { sample_hash: Vec<u8> },
}

impl ChangeDecision {
    pub fn needs_parse(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    pub fn carried_hash(&self) -> Option<&[u8]> {
        match self {
            Self::ChangedWithHash { sample_hash } => Some(sample_hash),
            _ => None,
        }
    }
}

/// Decides whether `path` (with `current_size`/`current_mtime` already
/// stat'd by the caller) needs reparsing against `existing`, the file's
/// current DB row if any. `provider_supports_content_hash` reflects
/// whether the provider can even store a sample hash — providers that
/// can't degrade to skipping verification (§4.3 item 5). `compute_sample`
/// is only invoked when the ladder actually needs it (step 6), so callers
/// don't pay for hashing unless the cheaper checks were inconclusive.
pub fn decide(
    existing: Option<&FileRecord>,
    current_size: u64,
    current_mtime: f64,
    provider_supports_content_hash: bool,
    path: &Path,
    cfg: &ChangeDetectorConfig,
    compute_sample: impl FnOnce(&Path, u64) -> io::Result<Vec<u8>>,
) -> ChangeDecision {
    if cfg.force_reindex {
        return ChangeDecision::Changed;
    }

    let Some(record) = existing else {
        return ChangeDecision::Changed;
    };

    if record.size != current_size {
        return ChangeDecision::Changed;
    }

    if (record.mtime - current_mtime).abs() > cfg.mtime_epsilon_seconds {
        return ChangeDecision::Changed;
    }

    if !cfg.verify_checksum_when_mtime_equal {
        return ChangeDecision::Unchanged;
    }

    if !provider_supports_content_hash {
        return ChangeDecision::Unchanged;
    }

    let fresh_hash = match compute_sample(path, cfg.checksum_sample_kb) {
        Ok(hash) => hash,
        Err(_) => return ChangeDecision::Changed,
    };

    match &record.content_hash {
        Some(stored) if stored == &fresh_hash => ChangeDecision::Unchanged,
        _ => ChangeDecision::ChangedWithHash { sample_hash: fresh_hash },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkhound_core::types::FileId;

    fn cfg() -> ChangeDetectorConfig {
        ChangeDetectorConfig {
            force_reindex: false,
            mtime_epsilon_seconds: 0.01,
            verify_checksum_when_mtime_equal: false,
            checksum_sample_kb: 64,
        }
    }

    fn record(size: u64, mtime: f64, hash: Option<Vec<u8>>) -> FileRecord {
        FileRecord {
            id: FileId(1),
            path: "a.py".into(),
            size,
            mtime,
            content_hash: hash,
        }
    }

    #[test]
    fn absent_file_is_changed() {
        let decision = decide(None, 10, 1.0, false, Path::new("a.py"), &cfg(), |_, _| unreachable!());
        assert_eq!(decision, ChangeDecision::Changed);
    }

    #[test]
    fn size_mismatch_is_changed() {
        let rec = record(10, 1.0, None);
        let decision = decide(Some(&rec), 11, 1.0, false, Path::new("a.py"), &cfg(), |_, _| unreachable!());
        assert_eq!(decision, ChangeDecision::Changed);
    }

    #[test]
    fn mtime_within_epsilon_and_no_checksum_is_unchanged() {
        let rec = record(10, 1.0, None);
        let decision = decide(Some(&rec), 10, 1.005, false, Path::new("a.py"), &cfg(), |_, _| unreachable!());
        assert_eq!(decision, ChangeDecision::Unchanged);
    }

    #[test]
    fn mtime_drift_beyond_epsilon_is_changed() {
        let rec = record(10, 1.0, None);
        let decision = decide(Some(&rec), 10, 2.0, false, Path::new("a.py"), &cfg(), |_, _| unreachable!());
        assert_eq!(decision, ChangeDecision::Changed);
    }

    #[test]
    fn matching_sample_hash_is_unchanged() {
        let mut c = cfg();
        c.verify_checksum_when_mtime_equal = true;
        let rec = record(10, 1.0, Some(vec![1, 2, 3]));
        let decision = decide(Some(&rec), 10, 1.0, true, Path::new("a.py"), &c, |_, _| Ok(vec![1, 2, 3]));
        assert_eq!(decision, ChangeDecision::Unchanged);
    }

    #[test]
    fn mismatched_sample_hash_carries_fresh_hash_forward() {
        let mut c = cfg();
        c.verify_checksum_when_mtime_equal = true;
        let rec = record(10, 1.0, Some(vec![1, 2, 3]));
        let decision = decide(Some(&rec), 10, 1.0, true, Path::new("a.py"), &c, |_, _| Ok(vec![9, 9, 9]));
        assert_eq!(decision, ChangeDecision::ChangedWithHash { sample_hash: vec![9, 9, 9] });
    }

    #[test]
    fn missing_stored_hash_computes_and_carries_forward() {
        let mut c = cfg();
        c.verify_checksum_when_mtime_equal = true;
        let rec = record(10, 1.0, None);
        let decision = decide(Some(&rec), 10, 1.0, true, Path::new("a.py"), &c, |_, _| Ok(vec![4, 5, 6]));
        assert_eq!(decision, ChangeDecision::ChangedWithHash { sample_hash: vec![4, 5, 6] });
    }

    #[test]
    fn provider_without_content_hash_column_skips_verification() {
        let mut c = cfg();
        c.verify_checksum_when_mtime_equal = true;
        let rec = record(10, 1.0, None);
        let decision = decide(Some(&rec), 10, 1.0, false, Path::new("a.py"), &c, |_, _| unreachable!());
        assert_eq!(decision, ChangeDecision::Unchanged);
    }

    #[test]
    fn force_reindex_always_changes() {
        let mut c = cfg();
        c.force_reindex = true;
        let rec = record(10, 1.0, None);
        let decision = decide(Some(&rec), 10, 1.0, false, Path::new("a.py"), &c, |_, _| unreachable!());
        assert_eq!(decision, ChangeDecision::Changed);
    }
}
