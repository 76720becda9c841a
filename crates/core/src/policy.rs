//! Two-tier retention policy

use crate::record::MonthKey;
use crate::{Error, Result};
use chrono::{Duration, Months, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Default short-term window in days
pub const DEFAULT_DAILY_DAYS: u32 = 30;
/// Default long-term window in calendar months
pub const DEFAULT_MONTHLY_MONTHS: u32 = 12;
/// Upper bound accepted for the daily window (ten years)
pub const MAX_DAILY_DAYS: u32 = 3650;
/// Upper bound accepted for the monthly window (a century)
pub const MAX_MONTHLY_MONTHS: u32 = 1200;

/// Retention policy configuration
///
/// Deserialises from the `[retention]` table of the config file. Values are
/// validated when the configuration is loaded, so the evaluator never sees
/// an out-of-range window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    /// Keep daily backups younger than this many days (default: 30)
    pub daily_days: u32,
    /// Keep one backup per calendar month for this many months (default: 12)
    pub monthly_months: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            daily_days: DEFAULT_DAILY_DAYS,
            monthly_months: DEFAULT_MONTHLY_MONTHS,
        }
    }
}

impl RetentionPolicy {
    /// Create a validated policy
    pub fn new(daily_days: u32, monthly_months: u32) -> Result<Self> {
        let policy = Self {
            daily_days,
            monthly_months,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Reject windows outside the supported range
    pub fn validate(&self) -> Result<()> {
        if self.daily_days > MAX_DAILY_DAYS {
            return Err(Error::DailyWindowOutOfRange {
                value: self.daily_days,
                max: MAX_DAILY_DAYS,
            });
        }
        if self.monthly_months > MAX_MONTHLY_MONTHS {
            return Err(Error::MonthlyWindowOutOfRange {
                value: self.monthly_months,
                max: MAX_MONTHLY_MONTHS,
            });
        }
        Ok(())
    }

    /// `now` minus the daily window
    ///
    /// Daily backups with a timestamp at or after this instant are kept.
    pub fn daily_cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        now.checked_sub_signed(Duration::days(i64::from(self.daily_days)))
            .unwrap_or(NaiveDateTime::MIN)
    }

    /// First instant of the month `monthly_months` calendar months before `now`'s month
    ///
    /// Uses calendar arithmetic, so the cutoff always lands on the first of a
    /// month regardless of how long the intervening months are. A window of
    /// zero means only the current month is covered.
    pub fn monthly_cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        MonthKey::of(now)
            .first_day()
            .checked_sub_months(Months::new(self.monthly_months))
            .map(|date| date.and_time(NaiveTime::MIN))
            .unwrap_or(NaiveDateTime::MIN)
    }

    /// Whether a month lies entirely inside the long-term window
    pub fn covers_month(&self, month: MonthKey, now: NaiveDateTime) -> bool {
        month.start() >= self.monthly_cutoff(now)
    }
}
