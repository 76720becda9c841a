//! Two-tier retention evaluation
//!
//! Given the backups found in one directory, decide which to keep:
//!
//! 1. Monthly-tier backups are grouped by month. Inside the monthly window
//!    the newest one in each month is kept and the month counts as
//!    represented; every other monthly backup is deleted.
//! 2. Daily-tier backups are grouped by month. A month inside the window
//!    that has no monthly backup gets its newest daily backup promoted to
//!    stand in for it, whatever its age. Remaining daily backups survive
//!    only while they are inside the daily window.
//!
//! Evaluation is a pure function of the records, the policy and `now`.

use chrono::NaiveDateTime;
use keepsake_core::{BackupFileRecord, MonthKey, RetentionPolicy, Tier};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome for a single backup file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Newest monthly backup of a month inside the monthly window
    KeepMonthly,
    /// Newest daily backup standing in for a month without a monthly backup
    KeepPromoted,
    /// Daily backup inside the daily window
    KeepRecent,
    /// Older monthly backup in a month that already has a representative
    DeleteDuplicateMonthly,
    /// Monthly backup for a month outside the monthly window
    DeleteExpiredMonthly,
    /// Daily backup outside the daily window and not promoted
    DeleteExpiredDaily,
}

impl Decision {
    pub fn keeps(self) -> bool {
        matches!(self, Decision::KeepMonthly | Decision::KeepPromoted | Decision::KeepRecent)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Decision::KeepMonthly => "keep (monthly)",
            Decision::KeepPromoted => "keep (promoted to monthly)",
            Decision::KeepRecent => "keep (within daily window)",
            Decision::DeleteDuplicateMonthly => "delete (duplicate monthly)",
            Decision::DeleteExpiredMonthly => "delete (month outside monthly window)",
            Decision::DeleteExpiredDaily => "delete (outside daily window)",
        };
        f.write_str(text)
    }
}

/// Keep/delete partition for one directory
#[derive(Debug, Clone)]
pub struct RetentionPlan {
    decisions: BTreeMap<PathBuf, Decision>,
    daily_cutoff: NaiveDateTime,
    monthly_cutoff: NaiveDateTime,
}

impl RetentionPlan {
    /// Decision for a path, if it was part of the evaluation
    pub fn decision(&self, path: &Path) -> Option<Decision> {
        self.decisions.get(path).copied()
    }

    /// All decisions in path order
    pub fn iter(&self) -> impl Iterator<Item = (&Path, Decision)> {
        self.decisions.iter().map(|(path, decision)| (path.as_path(), *decision))
    }

    pub fn keep(&self) -> BTreeSet<PathBuf> {
        self.paths_where(true)
    }

    pub fn delete(&self) -> BTreeSet<PathBuf> {
        self.paths_where(false)
    }

    pub fn keep_count(&self) -> usize {
        self.decisions.values().filter(|d| d.keeps()).count()
    }

    pub fn delete_count(&self) -> usize {
        self.decisions.len() - self.keep_count()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn daily_cutoff(&self) -> NaiveDateTime {
        self.daily_cutoff
    }

    pub fn monthly_cutoff(&self) -> NaiveDateTime {
        self.monthly_cutoff
    }

    fn paths_where(&self, keeps: bool) -> BTreeSet<PathBuf> {
        self.decisions
            .iter()
            .filter(|(_, d)| d.keeps() == keeps)
            .map(|(path, _)| path.clone())
            .collect()
    }
}

/// Partition `records` into files to keep and files to delete
pub fn evaluate(records: &[BackupFileRecord], policy: &RetentionPolicy, now: NaiveDateTime) -> RetentionPlan {
    let daily_cutoff = policy.daily_cutoff(now);
    let monthly_cutoff = policy.monthly_cutoff(now);
    let in_window = |month: &MonthKey| month.start() >= monthly_cutoff;

    let mut monthly: BTreeMap<MonthKey, Vec<&BackupFileRecord>> = BTreeMap::new();
    let mut daily: BTreeMap<MonthKey, Vec<&BackupFileRecord>> = BTreeMap::new();
    for record in records {
        let groups = match record.tier {
            Tier::Monthly => &mut monthly,
            Tier::Daily => &mut daily,
        };
        groups.entry(record.month_key()).or_default().push(record);
    }

    let mut decisions = BTreeMap::new();
    let mut represented = BTreeSet::new();

    for (month, mut group) in monthly {
        if !in_window(&month) {
            for record in group {
                decisions.insert(record.path.clone(), Decision::DeleteExpiredMonthly);
            }
            continue;
        }

        group.sort_by(|a, b| newest_first(a, b));
        let mut group = group.into_iter();
        if let Some(newest) = group.next() {
            decisions.insert(newest.path.clone(), Decision::KeepMonthly);
            represented.insert(month);
        }
        for duplicate in group {
            decisions.insert(duplicate.path.clone(), Decision::DeleteDuplicateMonthly);
        }
    }

    for (month, mut group) in daily {
        group.sort_by(|a, b| newest_first(a, b));
        let mut group = group.into_iter();

        if in_window(&month) && !represented.contains(&month) {
            if let Some(newest) = group.next() {
                decisions.insert(newest.path.clone(), Decision::KeepPromoted);
                represented.insert(month);
            }
        }

        for record in group {
            let decision = if record.timestamp >= daily_cutoff {
                Decision::KeepRecent
            } else {
                Decision::DeleteExpiredDaily
            };
            decisions.insert(record.path.clone(), decision);
        }
    }

    RetentionPlan {
        decisions,
        daily_cutoff,
        monthly_cutoff,
    }
}

/// Newest first; exact timestamp ties fall back to path order
fn newest_first(a: &BackupFileRecord, b: &BackupFileRecord) -> Ordering {
    b.timestamp.cmp(&a.timestamp).then_with(|| a.path.cmp(&b.path))
}
