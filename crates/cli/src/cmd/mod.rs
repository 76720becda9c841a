//! CLI command implementations

pub mod cleanup;
pub mod config;
pub mod seed;
pub mod status;
