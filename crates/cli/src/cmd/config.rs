//! Configuration management command
//!
//! Provides CLI interface to view and edit the keepsake configuration.

use cli_lib::system_config;
use anyhow::{Context, Result};
use keepsake_core::policy::{MAX_DAILY_DAYS, MAX_MONTHLY_MONTHS};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// List all configuration values
pub async fn run_list(config_path: &Path) -> Result<()> {
    let config = system_config::load(config_path)?;

    println!("{}", "Keepsake Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[retention]".yellow());
    println!(
        "  {} = {} {}",
        "daily_days".cyan(),
        config.retention.daily_days,
        format!("(every backup from the last {} days)", config.retention.daily_days).dimmed()
    );
    println!(
        "  {} = {} {}",
        "monthly_months".cyan(),
        config.retention.monthly_months,
        if config.retention.monthly_months == 0 {
            "(current month only)".dimmed().to_string()
        } else {
            format!("(one per month, {} months back)", config.retention.monthly_months)
                .dimmed()
                .to_string()
        }
    );

    println!("\n{}", "[logging]".yellow());
    println!(
        "  {} = {}",
        "directory".cyan(),
        match &config.logging.directory {
            Some(dir) => dir.display().to_string(),
            None => "(console only)".dimmed().to_string(),
        }
    );

    if !config.filesystem.is_empty() {
        println!("\n{}", "[[filesystem]]".yellow());
        for backup in &config.filesystem {
            println!(
                "  {} {} -> {}",
                backup.name.cyan(),
                backup.source.display(),
                backup.destination.display()
            );
        }
    }

    if !config.database.is_empty() {
        println!("\n{}", "[[database]]".yellow());
        for backup in &config.database {
            println!(
                "  {} {} -> {}",
                backup.name.cyan(),
                backup.database,
                backup.destination.display()
            );
        }
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  retention.daily_days: 0-{}", MAX_DAILY_DAYS);
    println!("  retention.monthly_months: 0-{}", MAX_MONTHLY_MONTHS);

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(config_path: &Path, key: &str) -> Result<()> {
    let config = system_config::load(config_path)?;

    let value = match key {
        "retention.daily_days" => config.retention.daily_days.to_string(),
        "retention.monthly_months" => config.retention.monthly_months.to_string(),
        "logging.directory" => config
            .logging
            .directory
            .map(|dir| dir.display().to_string())
            .unwrap_or_default(),
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'ks config --list' to see available keys.",
            key
        ),
    };

    println!("{}", value);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(config_path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load(config_path)?;

    match key {
        "retention.daily_days" => {
            let val: u32 = value.parse()
                .context("Invalid value: must be a non-negative integer")?;
            config.retention.daily_days = val;
        }
        "retention.monthly_months" => {
            let val: u32 = value.parse()
                .context("Invalid value: must be a non-negative integer")?;
            config.retention.monthly_months = val;
        }
        "logging.directory" => {
            config.logging.directory = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'ks config --list' to see available keys.",
            key
        ),
    }

    // Validate before saving
    config.validate()
        .context("Invalid configuration value")?;

    system_config::save(config_path, &config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);

    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(config_path: &Path, create: bool) -> Result<()> {
    if create && system_config::init_if_missing(config_path)? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    let example = system_config::example_config();
    println!("{}", example);
    Ok(())
}
