//! Shared helpers for unit tests

use crate::cleanup::DirectoryReport;
use crate::lock::LockError;
use crate::observer::CleanupObserver;
use chrono::{NaiveDate, NaiveDateTime};
use filetime::FileTime;
use keepsake_core::{classify, to_system_time, BackupFileRecord};
use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Midnight at the start of the given day
pub fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// In-memory record under `/backups` whose mtime equals its embedded date
pub fn record(name: &str) -> BackupFileRecord {
    let stamp = classify(name)
        .and_then(|c| c.stamp)
        .unwrap_or_else(|| panic!("{} has no embedded date", name));
    record_at(name, stamp)
}

/// In-memory record under `/backups` with an explicit mtime
pub fn record_at(name: &str, mtime: NaiveDateTime) -> BackupFileRecord {
    let class = classify(name).unwrap_or_else(|| panic!("{} is not a backup name", name));
    BackupFileRecord::new(PathBuf::from("/backups").join(name), name.to_string(), &class, mtime, 0)
}

/// Temporary backup directory
pub struct BackupDir {
    dir: TempDir,
}

impl BackupDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a file with the given modification time
    pub fn file(&self, name: &str, mtime: NaiveDateTime) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, name.as_bytes()).unwrap();
        filetime::set_file_mtime(&path, FileTime::from_system_time(to_system_time(mtime))).unwrap();
        path
    }

    /// Create a file whose mtime matches its embedded date
    pub fn backup(&self, name: &str) -> PathBuf {
        let stamp = classify(name).and_then(|c| c.stamp).unwrap();
        self.file(name, stamp)
    }

    /// Sorted names of the files left in the directory
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Observer that remembers what it was told
#[derive(Default)]
pub struct RecordingObserver {
    unavailable: RefCell<Vec<PathBuf>>,
    locked: RefCell<Vec<PathBuf>>,
    deleted: RefCell<Vec<PathBuf>>,
    failed: RefCell<Vec<PathBuf>>,
    finished: RefCell<Vec<PathBuf>>,
}

impl RecordingObserver {
    pub fn unavailable(&self) -> Vec<PathBuf> {
        self.unavailable.borrow().clone()
    }

    pub fn locked(&self) -> Vec<PathBuf> {
        self.locked.borrow().clone()
    }

    pub fn deleted(&self) -> Vec<PathBuf> {
        self.deleted.borrow().clone()
    }

    pub fn failed(&self) -> Vec<PathBuf> {
        self.failed.borrow().clone()
    }

    pub fn finished(&self) -> Vec<PathBuf> {
        self.finished.borrow().clone()
    }
}

impl CleanupObserver for RecordingObserver {
    fn directory_unavailable(&self, dir: &Path, _error: &io::Error) {
        self.unavailable.borrow_mut().push(dir.to_path_buf());
    }

    fn directory_locked(&self, dir: &Path, _error: &LockError) {
        self.locked.borrow_mut().push(dir.to_path_buf());
    }

    fn file_deleted(&self, path: &Path) {
        self.deleted.borrow_mut().push(path.to_path_buf());
    }

    fn delete_failed(&self, path: &Path, _error: &io::Error) {
        self.failed.borrow_mut().push(path.to_path_buf());
    }

    fn directory_finished(&self, report: &DirectoryReport) {
        self.finished.borrow_mut().push(report.directory.clone());
    }
}
