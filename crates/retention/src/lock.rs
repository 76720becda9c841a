//! Per-directory cleanup lock
//!
//! Cleanup and archive creation for one destination directory must not
//! overlap. Both sides take an exclusive `flock` on `.keepsake.lock` inside
//! the directory; the file records which process holds it so a lock left
//! behind by a crashed process can be taken over.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the lock file inside a destination directory
pub const LOCK_FILE_NAME: &str = ".keepsake.lock";

/// Why a directory could not be locked
#[derive(Debug, Error)]
pub enum LockError {
    /// A live process holds the lock
    #[error("{} is held by another keepsake process{}", path.display(), describe_holder(*holder))]
    Held { path: PathBuf, holder: Option<u32> },

    /// The lock file could not be created, opened or written
    #[error("cannot lock {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LockError {
    pub fn is_held(&self) -> bool {
        matches!(self, LockError::Held { .. })
    }
}

fn describe_holder(holder: Option<u32>) -> String {
    holder.map(|pid| format!(" (pid {})", pid)).unwrap_or_default()
}

/// Process recorded in a lock file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOwner {
    pub pid: u32,
    pub since: NaiveDateTime,
}

impl LockOwner {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            since: Local::now().naive_local(),
        }
    }

    fn read_from(file: &mut File) -> Option<Self> {
        let mut contents = String::new();
        file.seek(SeekFrom::Start(0)).ok()?;
        file.read_to_string(&mut contents).ok()?;
        serde_json::from_str(&contents).ok()
    }

    fn write_to(&self, file: &mut File) -> io::Result<()> {
        let contents = serde_json::to_vec(self)?;
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&contents)?;
        file.sync_all()
    }
}

/// Exclusive lock on a destination directory, released on drop
#[derive(Debug)]
pub struct CleanupLock {
    path: PathBuf,
    owner: LockOwner,
    released: bool,
    _file: File,
}

impl CleanupLock {
    /// Lock `dir`, which must already exist
    ///
    /// A lock file whose recorded owner is no longer running is taken over
    /// once. Anything else that stops the lock file from being opened is an
    /// [`LockError::Io`], never a held lock.
    pub fn acquire(dir: &Path) -> Result<Self, LockError> {
        let path = dir.join(LOCK_FILE_NAME);
        let io_err = |source: io::Error| LockError::Io {
            path: path.clone(),
            source,
        };

        let mut took_over = false;
        loop {
            let mut file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .open(&path)
                .map_err(io_err)?;

            if flock_nonblocking(&file).map_err(io_err)? {
                let owner = LockOwner::current();
                owner.write_to(&mut file).map_err(io_err)?;
                return Ok(Self {
                    path,
                    owner,
                    released: false,
                    _file: file,
                });
            }

            // Unreadable content while the flock is held: the holder is mid-write
            let holder = LockOwner::read_from(&mut file);
            match holder {
                Some(owner) if !took_over && !is_process_alive(owner.pid) => {
                    tracing::warn!(
                        "Taking over lock {} left by pid {} (since {})",
                        path.display(),
                        owner.pid,
                        owner.since
                    );
                    drop(file);
                    std::fs::remove_file(&path).map_err(io_err)?;
                    took_over = true;
                }
                _ => {
                    return Err(LockError::Held {
                        path,
                        holder: holder.map(|owner| owner.pid),
                    })
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn owner(&self) -> LockOwner {
        self.owner
    }

    /// Release the lock and remove the lock file
    pub fn release(mut self) -> io::Result<()> {
        self.released = true;
        std::fs::remove_file(&self.path)
    }
}

impl Drop for CleanupLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// `Ok(false)` when another open file description holds the lock
#[cfg(unix)]
fn flock_nonblocking(file: &File) -> io::Result<bool> {
    use nix::errno::Errno;
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(()) => Ok(true),
        Err(Errno::EWOULDBLOCK) => Ok(false),
        Err(errno) => Err(errno.into()),
    }
}

#[cfg(not(unix))]
fn flock_nonblocking(_file: &File) -> io::Result<bool> {
    Ok(true)
}

#[cfg(unix)]
fn is_process_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    // Null signal: existence check only; EPERM still means it exists
    !matches!(kill(Pid::from_raw(raw), None), Err(Errno::ESRCH))
}

#[cfg(not(unix))]
fn is_process_alive(_pid: u32) -> bool {
    true
}
