//! Directory scanning
//!
//! Lists the backup archives directly inside a destination directory.
//! [`scan_directory`] fails only when the directory itself cannot be listed;
//! problems with individual entries are reported to the observer and the
//! entry is left out.

use crate::observer::CleanupObserver;
use keepsake_core::{classify, from_system_time, BackupFileRecord};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Scan `dir`, reporting an unlistable directory to the observer
///
/// Same as [`scan_directory`] except that a directory that cannot be listed
/// yields an empty result after `directory_unavailable`.
pub fn scan(dir: &Path, observer: &dyn CleanupObserver) -> Vec<BackupFileRecord> {
    scan_directory(dir, observer).unwrap_or_else(|e| {
        observer.directory_unavailable(dir, &e);
        Vec::new()
    })
}

/// Scan `dir` for backup archives
///
/// Only regular files whose names classify as backups are returned.
/// Subdirectories are not descended into and symlinks are not followed.
/// The result is in no particular order.
pub fn scan_directory(dir: &Path, observer: &dyn CleanupObserver) -> io::Result<Vec<BackupFileRecord>> {
    let root = dir.canonicalize()?;
    if !root.is_dir() {
        return Err(io::Error::new(io::ErrorKind::Other, "not a directory"));
    }

    let mut records = Vec::new();

    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // An unreadable root surfaces here as the first error
                if e.depth() == 0 {
                    return Err(e
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "unreadable directory")));
                }
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                observer.entry_skipped(&path, &e.to_string());
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(filename) = entry.file_name().to_str() else {
            observer.entry_skipped(entry.path(), "file name is not valid UTF-8");
            continue;
        };

        let Some(class) = classify(filename) else {
            continue;
        };

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                observer.entry_skipped(entry.path(), &format!("cannot read metadata: {}", e));
                continue;
            }
        };

        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                observer.entry_skipped(entry.path(), &format!("cannot read modification time: {}", e));
                continue;
            }
        };

        records.push(BackupFileRecord::new(
            entry.path().to_path_buf(),
            filename.to_string(),
            &class,
            from_system_time(modified),
            metadata.len(),
        ));
    }

    Ok(records)
}
