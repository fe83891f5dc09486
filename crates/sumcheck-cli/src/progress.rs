use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use sumcheck_core::indexer::IndexStats;
use sumcheck_core::{Error, FileNode, IndexReporter, Mismatch, ScanReporter, ScanStats, Scope};
use tracing::{debug, error, info, warn};

/// Terminal reporter.
///
/// - Verify: one log line per skip, mismatch, repair and error as it happens
///   (per-file "checked" lines only at debug level)
/// - Index: spinner while walking a user's tree
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    pub fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
}

impl ScanReporter for CliReporter {
    fn on_scope_start(&self, scope: &Scope) {
        info!("Verifying {}", scope);
    }

    fn on_skipped(&self, node: &FileNode) {
        info!("No checksum for {}", node.display_path());
    }

    fn on_verified(&self, node: &FileNode) {
        debug!("Checked {}", node.display_path());
    }

    fn on_mismatch(&self, mismatch: &Mismatch) {
        warn!(
            "Mismatch for {}:\n Filecache:\t{}\n Actual:\t{}",
            mismatch.node.display_path().yellow(),
            mismatch.stored.red(),
            mismatch.actual.as_str().green(),
        );
    }

    fn on_repaired(&self, mismatch: &Mismatch) {
        info!("Repaired checksum of {}", mismatch.node.display_path().green());
    }

    fn on_error(&self, subject: &str, error: &Error) {
        error!("{}: {}", subject, error);
    }

    fn on_scope_complete(&self, scope: &Scope, stats: &ScanStats) {
        debug!(
            "Done with {}: {} files, {} verified, {} skipped, {} mismatches",
            scope, stats.files, stats.verified, stats.skipped, stats.mismatches
        );
    }
}

impl IndexReporter for CliReporter {
    fn on_index_start(&self, user: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(spinner_style());
        pb.set_message(format!("Indexing {}...", user));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_index_progress(&self, entries_seen: usize, current_path: &str) {
        let guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!("Indexing... {} entries ({})", entries_seen, current_path));
        }
    }

    fn on_index_complete(&self, user: &str, stats: &IndexStats, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  {} Indexed {}: {} added, {} updated, {} removed, {} hashed in {:.2}s",
            "✓".green(),
            user,
            stats.added,
            stats.updated,
            stats.removed,
            stats.hashed,
            duration_secs
        );
    }
}
