//! Progress and lifecycle events (§4.9), grounded on the teacher's
//! `DriftEventHandler`/`ScanStartedEvent` dispatch pattern: one small event
//! struct per phase transition, and a handler trait with a default no-op
//! implementation per method so callers only override what they care about.

use std::path::PathBuf;

/// The five phases the coordinator reports progress for (§4.9: "four bars:
/// discovery, change-scan, parse, store, plus orphan cleanup").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Discovery,
    ChangeScan,
    Parse,
    Store,
    OrphanCleanup,
}

#[derive(Debug, Clone)]
pub struct PhaseStartedEvent {
    pub phase: Phase,
    pub total: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct PhaseProgressEvent {
    pub phase: Phase,
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct PhaseCompleteEvent {
    pub phase: Phase,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct TimeoutEvent {
    pub path: PathBuf,
    pub timeout_secs: f64,
}

/// Event sink the Coordinator drives during `process_directory`/`process_file`.
/// All methods default to a no-op so a caller that only wants, say,
/// progress bars doesn't have to implement timeout notifications too.
pub trait CoordinatorEventHandler: Send + Sync {
    fn on_phase_started(&self, _event: &PhaseStartedEvent) {}
    fn on_phase_progress(&self, _event: &PhaseProgressEvent) {}
    fn on_phase_complete(&self, _event: &PhaseCompleteEvent) {}
    fn on_timeout(&self, _event: &TimeoutEvent) {}
}

/// The default handler: observes nothing, used when the caller doesn't
/// need progress reporting (e.g. in tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventHandler;

impl CoordinatorEventHandler for NoopEventHandler {}
