//! Deletion of expired backups

use crate::observer::CleanupObserver;
use std::io;
use std::path::{Path, PathBuf};

/// Removes one file
pub type RemoveFn = fn(&Path) -> io::Result<()>;

/// Remove each path, independently of the others
///
/// A failed removal is reported to the observer and skipped; it never stops
/// the remaining deletions. There is no retry. Returns the paths that were
/// actually removed, in deletion order.
pub fn delete_files(paths: &[PathBuf], observer: &dyn CleanupObserver) -> Vec<PathBuf> {
    delete_files_with(paths, observer, remove_file)
}

/// [`delete_files`] with a custom removal function
pub fn delete_files_with(paths: &[PathBuf], observer: &dyn CleanupObserver, remove: RemoveFn) -> Vec<PathBuf> {
    let mut deleted = Vec::with_capacity(paths.len());

    for path in paths {
        match remove(path) {
            Ok(()) => {
                observer.file_deleted(path);
                deleted.push(path.clone());
            }
            Err(e) => observer.delete_failed(path, &e),
        }
    }

    deleted
}

/// Default [`RemoveFn`]
pub fn remove_file(path: &Path) -> io::Result<()> {
    std::fs::remove_file(path)
}
