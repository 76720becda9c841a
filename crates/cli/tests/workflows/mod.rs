//! Workflow integration tests
//!
//! Tests for complete workflows that exercise multiple commands
//! and validate end-to-end behavior.

pub mod cleanup_scenarios;
pub mod dry_run;
pub mod seed_then_cleanup;
