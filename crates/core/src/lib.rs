//! Core types for Keepsake backups
//!
//! This crate provides:
//! - The backup filename contract (`YYYYMMDD-HHMMSS[-slug].<ext>.gz`)
//! - Daily/monthly tier classification
//! - Backup file records and month grouping keys
//! - The two-tier retention policy and its cutoffs
//! - Placeholder archive writing for synthetic backup sets

pub mod archive;
pub mod clock;
pub mod error;
pub mod naming;
pub mod policy;
pub mod record;

// Re-exports
pub use archive::{synthetic_stamps, write_placeholder_archive};
pub use clock::{from_system_time, parse_instant, to_system_time};
pub use error::{Error, Result};
pub use naming::{classify, validate_slug, ArchiveKind, BackupName, Classified, Tier};
pub use policy::RetentionPolicy;
pub use record::{BackupFileRecord, MonthKey};
