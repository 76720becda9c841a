//! Keepsake configuration file
//!
//! Stored as TOML at `$KS_CONFIG` or `<config dir>/keepsake/config.toml`.
//! A missing file means "all defaults, no destinations".

use anyhow::{Context, Result};
use keepsake_core::{validate_slug, RetentionPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub retention: RetentionPolicy,
    pub logging: LoggingConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filesystem: Vec<FilesystemBackup>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub database: Vec<DatabaseBackup>,
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily-rotated log files; console only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// `[[filesystem]]` entry: a directory tree archived as `.tar.gz`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesystemBackup {
    /// Used as the filename slug
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// `[[database]]` entry: a database dumped as `.sql.gz`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseBackup {
    /// Used as the filename slug
    pub name: String,
    pub database: String,
    pub destination: PathBuf,
}

/// Validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid [retention] section: {0}")]
    Retention(#[from] keepsake_core::Error),

    #[error("[[{section}]] entry has an invalid name {name:?}: {reason}")]
    InvalidName {
        section: &'static str,
        name: String,
        reason: String,
    },

    #[error("[[{section}]] name {name:?} is used more than once")]
    DuplicateName { section: &'static str, name: String },

    #[error("[[{section}]] {name:?}: destination {} must be an absolute path", path.display())]
    RelativeDestination {
        section: &'static str,
        name: String,
        path: PathBuf,
    },

    #[error("[logging] directory {} must be an absolute path", .0.display())]
    RelativeLogDirectory(PathBuf),
}

impl Config {
    /// Check every value before it reaches the cleanup engine
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.retention.validate()?;

        if let Some(dir) = &self.logging.directory {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDirectory(dir.clone()));
            }
        }

        let filesystem = self.filesystem.iter().map(|b| (b.name.as_str(), b.destination.as_path()));
        validate_entries("filesystem", filesystem)?;

        let database = self.database.iter().map(|b| (b.name.as_str(), b.destination.as_path()));
        validate_entries("database", database)?;

        Ok(())
    }

    /// Validated retention policy
    pub fn policy(&self) -> std::result::Result<RetentionPolicy, ConfigError> {
        self.retention.validate()?;
        Ok(self.retention)
    }

    /// De-duplicated destination directories, filesystem backups first
    pub fn destinations(&self) -> Vec<PathBuf> {
        let filesystem = self.filesystem.iter().map(|b| b.destination.as_path());
        let database = self.database.iter().map(|b| b.destination.as_path());
        retention::resolve_destinations(filesystem.chain(database))
    }
}

fn validate_entries<'a>(
    section: &'static str,
    entries: impl Iterator<Item = (&'a str, &'a Path)>,
) -> std::result::Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for (name, destination) in entries {
        if let Err(e) = validate_slug(name) {
            return Err(ConfigError::InvalidName {
                section,
                name: name.to_string(),
                reason: e.to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateName {
                section,
                name: name.to_string(),
            });
        }
        if !destination.is_absolute() {
            return Err(ConfigError::RelativeDestination {
                section,
                name: name.to_string(),
                path: destination.to_path_buf(),
            });
        }
    }

    Ok(())
}

/// Resolve the config file location
///
/// An explicit path (from `--config` or `KS_CONFIG`) wins over the
/// platform config directory.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path(),
    }
}

/// Default config file location: `<config dir>/keepsake/config.toml`
pub fn config_file_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine the user config directory")?;
    Ok(base.join("keepsake").join("config.toml"))
}

/// Load and validate the config at `path`
///
/// A missing file yields the default configuration.
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    Ok(config)
}

/// Validate and write `config` to `path`
pub fn save(path: &Path, config: &Config) -> Result<()> {
    config.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;

    Ok(())
}

/// Write the example config to `path` unless a file is already there
///
/// Returns whether a file was created.
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    std::fs::write(path, example_config())
        .with_context(|| format!("Failed to write config file {}", path.display()))?;

    Ok(true)
}

/// Commented example configuration
pub fn example_config() -> &'static str {
    r#"# Keepsake configuration

[retention]
# Keep every daily backup younger than this many days (0-3650)
daily_days = 30
# Keep one backup per calendar month for this many months (0-1200)
monthly_months = 12

[logging]
# Uncomment to also write daily-rotated log files
# directory = "/var/log/keepsake"

# Directory trees, archived as YYYYMMDD-HHMMSS-<name>.tar.gz
[[filesystem]]
name = "www"
source = "/var/www"
destination = "/srv/backups/www"

# Database dumps, archived as YYYYMMDD-HHMMSS-<name>.sql.gz
[[database]]
name = "app"
database = "app_production"
destination = "/srv/backups/db"
"#
}
