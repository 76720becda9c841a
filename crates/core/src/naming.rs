//! Backup filename contract
//!
//! Archives are named `YYYYMMDD-HHMMSS[-<slug>].<ext>.gz` where `<ext>` is
//! `tar` (filesystem trees) or `sql` (database dumps), e.g.
//! `20240301-020000-production.tar.gz`.
//!
//! Classification is strict: the leading token must be exactly eight digits,
//! a dash and six digits forming a real calendar date and time. Anything
//! looser is treated as "no embedded date" rather than guessed at.

use crate::{Error, Result};
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of the `YYYYMMDD-HHMMSS` token
const STAMP_LEN: usize = 15;

/// chrono format of the leading token
const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Kind of archive, determined by the inner extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    /// Compressed filesystem tree (`.tar.gz`)
    Tar,
    /// Compressed database dump (`.sql.gz`)
    Sql,
}

impl ArchiveKind {
    /// Full file suffix including the compression extension
    pub fn suffix(self) -> &'static str {
        match self {
            ArchiveKind::Tar => ".tar.gz",
            ArchiveKind::Sql => ".sql.gz",
        }
    }

    fn strip(name: &str) -> Option<(&str, ArchiveKind)> {
        [ArchiveKind::Tar, ArchiveKind::Sql]
            .into_iter()
            .find_map(|kind| name.strip_suffix(kind.suffix()).map(|stem| (stem, kind)))
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveKind::Tar => f.write_str("tar"),
            ArchiveKind::Sql => f.write_str("sql"),
        }
    }
}

impl FromStr for ArchiveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tar" => Ok(ArchiveKind::Tar),
            "sql" => Ok(ArchiveKind::Sql),
            other => Err(Error::UnknownArchiveKind(other.to_string())),
        }
    }
}

/// Retention tier of a backup file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Any backup not taken on the first of a month
    Daily,
    /// Backup whose embedded date falls on day `01`
    Monthly,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Daily => f.write_str("daily"),
            Tier::Monthly => f.write_str("monthly"),
        }
    }
}

/// Result of classifying a filename that carries a backup extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: ArchiveKind,
    /// Embedded timestamp, `None` if the name has no valid leading token
    pub stamp: Option<NaiveDateTime>,
    pub slug: Option<String>,
}

impl Classified {
    /// Tier derived from the embedded date alone
    ///
    /// Names without a parsable date are always `Daily`.
    pub fn tier(&self) -> Tier {
        match self.stamp {
            Some(stamp) if stamp.day() == 1 => Tier::Monthly,
            _ => Tier::Daily,
        }
    }
}

/// Classify a bare filename
///
/// Returns `None` for anything that is not a `.tar.gz` / `.sql.gz` archive,
/// including in-progress files such as `name.tar.gz.partial`.
pub fn classify(filename: &str) -> Option<Classified> {
    let (stem, kind) = ArchiveKind::strip(filename)?;
    if stem.is_empty() {
        return None;
    }

    let (stamp, slug) = match parse_stamp(stem) {
        Some((stamp, rest)) => {
            let slug = rest.strip_prefix('-').filter(|s| !s.is_empty());
            (Some(stamp), slug.map(str::to_string))
        }
        None => (None, None),
    };

    Some(Classified { kind, stamp, slug })
}

/// Parse the leading `YYYYMMDD-HHMMSS` token of a stem
///
/// The token must be followed by the end of the stem or by `-`.
fn parse_stamp(stem: &str) -> Option<(NaiveDateTime, &str)> {
    let token = stem.get(..STAMP_LEN)?;
    let rest = &stem[STAMP_LEN..];

    let well_formed = token.bytes().enumerate().all(|(i, b)| {
        if i == 8 {
            b == b'-'
        } else {
            b.is_ascii_digit()
        }
    });
    if !well_formed || !(rest.is_empty() || rest.starts_with('-')) {
        return None;
    }

    NaiveDateTime::parse_from_str(token, STAMP_FORMAT)
        .ok()
        .map(|stamp| (stamp, rest))
}

/// Name of an archive as produced by the archive-creation side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupName {
    pub kind: ArchiveKind,
    pub stamp: NaiveDateTime,
    pub slug: Option<String>,
}

impl BackupName {
    /// Build a name, validating the slug
    pub fn new(kind: ArchiveKind, stamp: NaiveDateTime, slug: Option<&str>) -> Result<Self> {
        if let Some(slug) = slug {
            validate_slug(slug)?;
        }

        // Sub-second precision cannot survive the filename round trip
        let stamp = stamp.with_nanosecond(0).unwrap_or(stamp);

        Ok(Self {
            kind,
            stamp,
            slug: slug.map(str::to_string),
        })
    }

    pub fn tier(&self) -> Tier {
        if self.stamp.day() == 1 {
            Tier::Monthly
        } else {
            Tier::Daily
        }
    }
}

impl fmt::Display for BackupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stamp.format(STAMP_FORMAT))?;
        if let Some(slug) = &self.slug {
            write!(f, "-{}", slug)?;
        }
        f.write_str(self.kind.suffix())
    }
}

/// Check that a slug is safe to embed in a filename
pub fn validate_slug(slug: &str) -> Result<()> {
    let valid = !slug.is_empty()
        && !slug.starts_with('.')
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidSlug(slug.to_string()))
    }
}
