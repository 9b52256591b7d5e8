//! Indexing configuration (§6), following the teacher's `ScanConfig` idiom:
//! `Option<T>` fields with `#[serde(default)]` and `effective_*` accessors
//! that apply the documented default, so a partially-specified TOML file
//! and the fully-defaulted struct behave identically.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub force_reindex: bool,
    pub cleanup: bool,
    pub per_file_timeout_seconds: f64,
    pub per_file_timeout_min_size_kb: u64,
    pub max_concurrent: usize,
    pub mtime_epsilon_seconds: f64,
    pub verify_checksum_when_mtime_equal: bool,
    pub checksum_sample_kb: u64,
    pub config_file_size_threshold_kb: u64,
    pub parallel_discovery: bool,
    pub min_dirs_for_parallel: usize,
    pub max_discovery_workers: usize,
    pub use_inode_ordering: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            force_reindex: false,
            cleanup: true,
            per_file_timeout_seconds: 0.0,
            per_file_timeout_min_size_kb: 128,
            max_concurrent: 0,
            mtime_epsilon_seconds: 0.01,
            verify_checksum_when_mtime_equal: false,
            checksum_sample_kb: 64,
            config_file_size_threshold_kb: 20,
            parallel_discovery: true,
            min_dirs_for_parallel: 4,
            max_discovery_workers: 16,
            use_inode_ordering: false,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

impl IndexConfig {
    /// Parse an `IndexConfig` from a TOML document, falling back to
    /// defaults for any field the document omits.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Whether the per-file parse timeout is active at all (§6: "0 disables").
    pub fn timeouts_enabled(&self) -> bool {
        self.per_file_timeout_seconds > 0.0
    }

    /// Whether parallel discovery should be attempted for a given number of
    /// eligible top-level directories (§4.2).
    pub fn should_parallelize_discovery(&self, eligible_top_level_dirs: usize) -> bool {
        self.parallel_discovery && eligible_top_level_dirs >= self.min_dirs_for_parallel
    }
}
