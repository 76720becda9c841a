//! Keepsake CLI support library
//!
//! Configuration, logging setup and formatting helpers shared by the `ks`
//! binary and its integration tests.

pub mod logging;
pub mod system_config;
pub mod util;
