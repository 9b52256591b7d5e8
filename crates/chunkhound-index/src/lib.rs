//! # chunkhound-index
//!
//! Change detection, hashing, the parse worker pool (with process-isolated
//! timeouts), and the chunk differ — the CPU-bound half of the indexing
//! coordinator (§4.3–§4.6).

pub mod change_detector;
pub mod diff;
pub mod hashing;
pub mod parse;
pub mod schedule;

pub use change_detector::{decide, ChangeDecision, ChangeDetectorConfig};
pub use diff::{diff_chunks, ChunkDiff};
pub use hashing::sample_hash_file;
pub use schedule::{batch_size, partition_into_batches, run_batches, worker_count, Batch, SchedulerConfig};
