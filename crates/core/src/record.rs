//! Backup file records

use crate::naming::{ArchiveKind, Classified, Tier};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::path::{Path, PathBuf};

/// Calendar year-month used to group backups
///
/// Stored as the first day of the month, so ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    /// Month containing `ts`
    pub fn of(ts: NaiveDateTime) -> Self {
        let date = ts.date();
        Self(date - Days::new(u64::from(date.day0())))
    }

    /// Month for the given year and month number, if valid
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// First instant of the month
    pub fn start(&self) -> NaiveDateTime {
        self.0.and_time(NaiveTime::MIN)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// A classified backup file found on disk
///
/// Built fresh on every scan and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFileRecord {
    /// Absolute path to the archive
    pub path: PathBuf,
    /// Base name, as matched against the filename contract
    pub filename: String,
    /// Modification time; authoritative for every age comparison
    pub timestamp: NaiveDateTime,
    /// Date embedded in the filename, if it parsed
    pub embedded: Option<NaiveDateTime>,
    pub tier: Tier,
    pub kind: ArchiveKind,
    /// Size in bytes, for reporting
    pub size: u64,
}

impl BackupFileRecord {
    /// Build a record from a classified name and the file's metadata
    pub fn new(path: PathBuf, filename: String, class: &Classified, timestamp: NaiveDateTime, size: u64) -> Self {
        Self {
            path,
            filename,
            timestamp,
            embedded: class.stamp,
            tier: class.tier(),
            kind: class.kind,
            size,
        }
    }

    /// Grouping key derived from the modification time
    pub fn month_key(&self) -> MonthKey {
        MonthKey::of(self.timestamp)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
