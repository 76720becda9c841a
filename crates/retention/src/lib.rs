//! Retention cleanup for Keepsake backup directories
//!
//! This crate provides:
//! - Directory scanning into classified backup records
//! - The two-tier retention evaluator (monthly first, daily as fallback)
//! - Failure-tolerant deletion
//! - Per-directory orchestration with reporting and locking
//!
//! Diagnostics flow through an explicit [`CleanupObserver`] rather than a
//! process-wide logger.

pub mod cleanup;
pub mod evaluate;
pub mod execute;
pub mod lock;
pub mod observer;
pub mod scan;

#[cfg(test)]
mod testutil;

// Re-exports
pub use cleanup::{resolve_destinations, Cleanup, CleanupReport, DirectoryReport, DirectoryStatus, RunMode};
pub use evaluate::{evaluate, Decision, RetentionPlan};
pub use execute::{delete_files, delete_files_with, RemoveFn};
pub use lock::{CleanupLock, LockError, LockOwner, LOCK_FILE_NAME};
pub use observer::{CleanupObserver, TracingObserver};
pub use scan::{scan, scan_directory};
