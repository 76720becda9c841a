//! Cleanup orchestration across destination directories
//!
//! For each directory, in order: check it exists, take its lock, scan,
//! evaluate, delete. Directories are independent; a problem in one is
//! reported and the run moves on to the next.

use crate::evaluate::evaluate;
use crate::execute::{delete_files_with, remove_file, RemoveFn};
use crate::lock::{CleanupLock, LockError};
use crate::observer::CleanupObserver;
use crate::scan::scan_directory;
use chrono::NaiveDateTime;
use keepsake_core::RetentionPolicy;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// Whether deletions are carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Apply,
    /// Plan only; report what would be deleted
    DryRun,
}

/// What happened to a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryStatus {
    Cleaned,
    /// Missing, unreadable, not a directory, or its lock file cannot be opened
    Unavailable,
    /// Another process holds the directory lock
    Locked,
}

/// Result of cleaning one directory
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    pub status: DirectoryStatus,
    /// Backup files found
    pub scanned: usize,
    pub kept: usize,
    /// Removed files, in deletion order (planned removals in a dry run)
    pub deleted: Vec<PathBuf>,
    /// Files the evaluator marked for deletion that could not be removed
    pub failed: Vec<PathBuf>,
    pub bytes_freed: u64,
}

impl DirectoryReport {
    fn skipped(directory: &Path, status: DirectoryStatus) -> Self {
        Self {
            directory: directory.to_path_buf(),
            status,
            scanned: 0,
            kept: 0,
            deleted: Vec::new(),
            failed: Vec::new(),
            bytes_freed: 0,
        }
    }
}

/// Result of a whole cleanup run
#[derive(Debug, Clone, Serialize)]
pub struct CleanupReport {
    pub mode: RunMode,
    pub now: NaiveDateTime,
    pub policy: RetentionPolicy,
    pub directories: Vec<DirectoryReport>,
}

impl CleanupReport {
    /// Every deleted path across all directories, in deletion order
    pub fn deleted_paths(&self) -> Vec<&Path> {
        self.directories
            .iter()
            .flat_map(|d| d.deleted.iter().map(PathBuf::as_path))
            .collect()
    }

    pub fn total_deleted(&self) -> usize {
        self.directories.iter().map(|d| d.deleted.len()).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.directories.iter().map(|d| d.failed.len()).sum()
    }

    pub fn total_kept(&self) -> usize {
        self.directories.iter().map(|d| d.kept).sum()
    }

    pub fn bytes_freed(&self) -> u64 {
        self.directories.iter().map(|d| d.bytes_freed).sum()
    }
}

/// Cleanup driver
pub struct Cleanup<'a> {
    policy: RetentionPolicy,
    observer: &'a dyn CleanupObserver,
    mode: RunMode,
    remove: RemoveFn,
}

impl<'a> Cleanup<'a> {
    /// Create a cleanup that deletes and locks each directory
    pub fn new(policy: RetentionPolicy, observer: &'a dyn CleanupObserver) -> Self {
        Self {
            policy,
            observer,
            mode: RunMode::Apply,
            remove: remove_file,
        }
    }

    pub fn mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the function used to delete files
    pub fn remover(mut self, remove: RemoveFn) -> Self {
        self.remove = remove;
        self
    }

    /// Clean every directory in turn
    ///
    /// Duplicate directories are cleaned once.
    pub fn run<I, P>(&self, dirs: I, now: NaiveDateTime) -> CleanupReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let directories = resolve_destinations(dirs)
            .iter()
            .map(|dir| self.run_directory(dir, now))
            .collect();

        CleanupReport {
            mode: self.mode,
            now,
            policy: self.policy,
            directories,
        }
    }

    /// Clean a single directory
    pub fn run_directory(&self, dir: &Path, now: NaiveDateTime) -> DirectoryReport {
        match std::fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                let err = io::Error::new(io::ErrorKind::Other, "not a directory");
                return self.skip(dir, DirectoryStatus::Unavailable, |o| o.directory_unavailable(dir, &err));
            }
            Err(e) => {
                return self.skip(dir, DirectoryStatus::Unavailable, |o| o.directory_unavailable(dir, &e));
            }
        }

        // Held until the end of this function
        let _lock = match self.mode {
            RunMode::Apply => match CleanupLock::acquire(dir) {
                Ok(lock) => Some(lock),
                Err(e @ LockError::Held { .. }) => {
                    return self.skip(dir, DirectoryStatus::Locked, |o| o.directory_locked(dir, &e));
                }
                Err(LockError::Io { source, .. }) => {
                    return self.skip(dir, DirectoryStatus::Unavailable, |o| {
                        o.directory_unavailable(dir, &source)
                    });
                }
            },
            RunMode::DryRun => None,
        };

        let records = match scan_directory(dir, self.observer) {
            Ok(records) => records,
            Err(e) => {
                return self.skip(dir, DirectoryStatus::Unavailable, |o| o.directory_unavailable(dir, &e));
            }
        };
        let plan = evaluate(&records, &self.policy, now);
        self.observer.plan_ready(dir, &plan);

        let sizes: HashMap<&Path, u64> = records.iter().map(|r| (r.path(), r.size)).collect();
        let doomed: Vec<PathBuf> = plan.delete().into_iter().collect();

        let (deleted, failed) = match self.mode {
            RunMode::Apply => {
                let deleted = delete_files_with(&doomed, self.observer, self.remove);
                let removed: HashSet<&PathBuf> = deleted.iter().collect();
                let failed = doomed.iter().filter(|p| !removed.contains(p)).cloned().collect();
                (deleted, failed)
            }
            RunMode::DryRun => (doomed, Vec::new()),
        };

        let bytes_freed: u64 = deleted
            .iter()
            .map(|p| sizes.get(p.as_path()).copied().unwrap_or(0))
            .sum();

        let report = DirectoryReport {
            directory: dir.to_path_buf(),
            status: DirectoryStatus::Cleaned,
            scanned: records.len(),
            kept: plan.keep_count(),
            deleted,
            failed,
            bytes_freed,
        };

        self.observer.directory_finished(&report);
        report
    }

    fn skip(
        &self,
        dir: &Path,
        status: DirectoryStatus,
        notify: impl FnOnce(&dyn CleanupObserver),
    ) -> DirectoryReport {
        notify(self.observer);
        let report = DirectoryReport::skipped(dir, status);
        self.observer.directory_finished(&report);
        report
    }
}

/// De-duplicate destination directories, keeping first-appearance order
///
/// Paths that resolve to the same existing directory count as one; paths
/// that do not exist are compared as written.
pub fn resolve_destinations<I, P>(dirs: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for dir in dirs {
        let dir = dir.as_ref();
        let key = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        if seen.insert(key) {
            resolved.push(dir.to_path_buf());
        }
    }

    resolved
}
