//! Test environments for integration tests
//!
//! Each environment is a temporary directory holding a config file path
//! and any number of backup destination directories.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use filetime::FileTime;
use keepsake_core::{classify, parse_instant, to_system_time};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated keepsake environment
pub struct TestEnv {
    temp_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new().context("Failed to create temp dir")?,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Config file location (not created until written)
    pub fn config_path(&self) -> PathBuf {
        self.root().join("config.toml")
    }

    pub fn write_config(&self, contents: &str) -> Result<()> {
        std::fs::write(self.config_path(), contents).context("Failed to write config")
    }

    /// Create (if needed) and return a destination directory
    pub fn destination(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root().join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Config with one filesystem and one database job per destination
    pub fn configure(&self, daily_days: u32, monthly_months: u32, destinations: &[&Path]) -> Result<()> {
        let mut config = format!(
            "[retention]\ndaily_days = {}\nmonthly_months = {}\n",
            daily_days, monthly_months
        );
        for (i, dest) in destinations.iter().enumerate() {
            config.push_str(&format!(
                "\n[[filesystem]]\nname = \"fs{i}\"\nsource = \"/var/www\"\ndestination = \"{}\"\n",
                dest.display()
            ));
            config.push_str(&format!(
                "\n[[database]]\nname = \"db{i}\"\ndatabase = \"app\"\ndestination = \"{}\"\n",
                dest.display()
            ));
        }
        self.write_config(&config)
    }
}

/// Write a backup file whose mtime matches its embedded timestamp
pub fn backup(dir: &Path, name: &str) -> Result<PathBuf> {
    let stamp = classify(name)
        .and_then(|c| c.stamp)
        .with_context(|| format!("{} carries no timestamp", name))?;
    backup_at(dir, name, stamp)
}

/// Write a backup file with an explicit mtime
pub fn backup_at(dir: &Path, name: &str, mtime: NaiveDateTime) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, b"backup")?;
    filetime::set_file_mtime(&path, FileTime::from_system_time(to_system_time(mtime)))?;
    Ok(path)
}

/// Parse a local timestamp literal
pub fn ts(input: &str) -> NaiveDateTime {
    parse_instant(input).expect("valid timestamp literal")
}

/// Sorted file names in `dir`
pub fn names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().to_string());
    }
    names.sort();
    Ok(names)
}
