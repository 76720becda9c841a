//! Error type for core operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("daily window of {value} days is out of range (0-{max})")]
    DailyWindowOutOfRange { value: u32, max: u32 },

    #[error("monthly window of {value} months is out of range (0-{max})")]
    MonthlyWindowOutOfRange { value: u32, max: u32 },

    #[error("invalid slug {0:?}: use ASCII letters, digits, '_', '.' or '-'")]
    InvalidSlug(String),

    #[error("unknown archive kind {0:?} (expected 'tar' or 'sql')")]
    UnknownArchiveKind(String),

    #[error("cannot parse {0:?} as a timestamp (expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)")]
    InvalidInstant(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
