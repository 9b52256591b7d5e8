//! User-visible run statistics (§7): the only output a caller sees besides
//! per-file error entries and timeout notifications streamed via
//! `CoordinatorEventHandler`.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub files_processed: usize,
    pub total_chunks: usize,
    pub skipped: usize,
    pub skipped_due_to_timeout: usize,
    pub skipped_unchanged: usize,
    pub skipped_filtered: usize,
    pub errors: Vec<FileError>,
}

impl IndexStats {
    pub fn merge(&mut self, other: IndexStats) {
        self.files_processed += other.files_processed;
        self.total_chunks += other.total_chunks;
        self.skipped += other.skipped;
        self.skipped_due_to_timeout += other.skipped_due_to_timeout;
        self.skipped_unchanged += other.skipped_unchanged;
        self.skipped_filtered += other.skipped_filtered;
        self.errors.extend(other.errors);
    }
}
