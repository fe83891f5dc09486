use crate::error::Error;
use crate::indexer::IndexStats;
use crate::model::FileNode;
use crate::scanner::{Mismatch, ScanStats, Scope};

/// Receives scanner diagnostics as they are discovered.
///
/// CLI implements with tracing and colored output, tests record events.
/// All methods have default no-op implementations.
pub trait ScanReporter: Send + Sync {
    fn on_scope_start(&self, _scope: &Scope) {}
    /// File has no recorded checksum, nothing to compare.
    fn on_skipped(&self, _node: &FileNode) {}
    fn on_verified(&self, _node: &FileNode) {}
    fn on_mismatch(&self, _mismatch: &Mismatch) {}
    fn on_repaired(&self, _mismatch: &Mismatch) {}
    /// A file, folder or user could not be processed. `subject` names it.
    fn on_error(&self, _subject: &str, _error: &Error) {}
    fn on_scope_complete(&self, _scope: &Scope, _stats: &ScanStats) {}
}

/// Progress of an index run.
pub trait IndexReporter: Send + Sync {
    fn on_index_start(&self, _user: &str) {}
    fn on_index_progress(&self, _entries_seen: usize, _current_path: &str) {}
    fn on_index_complete(&self, _user: &str, _stats: &IndexStats, _duration_secs: f64) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl ScanReporter for SilentReporter {}

impl IndexReporter for SilentReporter {}
