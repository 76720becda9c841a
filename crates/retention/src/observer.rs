//! Cleanup diagnostics
//!
//! The scanner, executor and orchestrator report everything noteworthy to a
//! `CleanupObserver` handed to them by the caller. `TracingObserver` is the
//! production implementation.

use crate::cleanup::DirectoryReport;
use crate::evaluate::RetentionPlan;
use crate::lock::LockError;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Receiver for cleanup events
///
/// Every method has an empty default so implementors only pick what they need.
pub trait CleanupObserver {
    /// A destination directory is missing, unreadable or not a directory
    fn directory_unavailable(&self, _dir: &Path, _error: &io::Error) {}

    /// Another process holds the directory's cleanup lock
    fn directory_locked(&self, _dir: &Path, _error: &LockError) {}

    /// A directory entry was ignored during the scan
    fn entry_skipped(&self, _path: &Path, _reason: &str) {}

    /// The evaluator finished planning a directory
    fn plan_ready(&self, _dir: &Path, _plan: &RetentionPlan) {}

    fn file_deleted(&self, _path: &Path) {}

    fn delete_failed(&self, _path: &Path, _error: &io::Error) {}

    fn directory_finished(&self, _report: &DirectoryReport) {}
}

/// Forwards cleanup events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CleanupObserver for TracingObserver {
    fn directory_unavailable(&self, dir: &Path, error: &io::Error) {
        warn!("Skipping backup directory {}: {}", dir.display(), error);
    }

    fn directory_locked(&self, dir: &Path, error: &LockError) {
        warn!("Skipping backup directory {}: {}", dir.display(), error);
    }

    fn entry_skipped(&self, path: &Path, reason: &str) {
        debug!("Ignoring {}: {}", path.display(), reason);
    }

    fn plan_ready(&self, dir: &Path, plan: &RetentionPlan) {
        info!(
            "Retention plan for {}: keep {}, delete {} (daily cutoff {}, monthly cutoff {})",
            dir.display(),
            plan.keep_count(),
            plan.delete_count(),
            plan.daily_cutoff(),
            plan.monthly_cutoff()
        );
        for (path, decision) in plan.iter() {
            debug!("{}: {}", path.display(), decision);
        }
    }

    fn file_deleted(&self, path: &Path) {
        info!("Deleted {}", path.display());
    }

    fn delete_failed(&self, path: &Path, error: &io::Error) {
        warn!("Failed to delete {}: {}", path.display(), error);
    }

    fn directory_finished(&self, report: &DirectoryReport) {
        debug!(
            "Finished {}: scanned {}, kept {}, deleted {}, failed {}",
            report.directory.display(),
            report.scanned,
            report.kept,
            report.deleted.len(),
            report.failed.len()
        );
    }
}
