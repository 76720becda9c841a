//! Placeholder archives with synthetic timestamps
//!
//! Used to populate a destination directory with a realistic spread of
//! dated backups, so cleanup can be exercised without running real
//! archive or dump tools.

use crate::clock::to_system_time;
use crate::naming::BackupName;
use crate::record::MonthKey;
use crate::{Error, Result};
use chrono::{Duration, Months, NaiveDateTime};
use filetime::FileTime;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write a gzip-compressed archive named after `name` into `dir`
///
/// The data goes to a hidden `.partial` file first, which the classifier
/// never matches, and is renamed into place once synced. The final file's
/// modification time is set to the timestamp embedded in its name.
pub fn write_placeholder_archive(dir: &Path, name: &BackupName, payload: &[u8]) -> Result<PathBuf> {
    let file_name = name.to_string();
    let target = dir.join(&file_name);
    let tmp = dir.join(format!(".{}.partial", file_name));

    let file = File::create(&tmp).map_err(|e| Error::io(&tmp, e))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(payload).map_err(|e| Error::io(&tmp, e))?;
    let file = encoder.finish().map_err(|e| Error::io(&tmp, e))?;
    file.sync_all().map_err(|e| Error::io(&tmp, e))?;
    drop(file);

    std::fs::rename(&tmp, &target).map_err(|e| Error::io(&target, e))?;

    let mtime = FileTime::from_system_time(to_system_time(name.stamp));
    filetime::set_file_mtime(&target, mtime).map_err(|e| Error::io(&target, e))?;

    Ok(target)
}

/// Timestamps for a synthetic backup history ending at `now`
///
/// One per day for the last `days` days (including today), plus one on the
/// first of each of the last `monthly_months` months (including the current
/// one), all at `now`'s time of day. Sorted oldest first, without
/// duplicates, never later than `now`.
pub fn synthetic_stamps(now: NaiveDateTime, days: u32, monthly_months: u32) -> Vec<NaiveDateTime> {
    let mut stamps = BTreeSet::new();

    for offset in 0..days {
        if let Some(ts) = now.checked_sub_signed(Duration::days(i64::from(offset))) {
            stamps.insert(ts);
        }
    }

    let current_month = MonthKey::of(now).first_day();
    for offset in 0..monthly_months {
        if let Some(first) = current_month.checked_sub_months(Months::new(offset)) {
            let ts = first.and_time(now.time());
            if ts <= now {
                stamps.insert(ts);
            }
        }
    }

    stamps.into_iter().collect()
}
