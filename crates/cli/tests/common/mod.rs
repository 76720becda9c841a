//! Common utilities for integration tests

pub mod fixtures;

// Re-export commonly used items
pub use fixtures::{backup, backup_at, names, ts, TestEnv};
