//! Apply the retention policy to backup directories

use anyhow::{Context, Result};
use cli_lib::system_config;
use cli_lib::util;
use keepsake_core::RetentionPolicy;
use owo_colors::OwoColorize;
use retention::{Cleanup, CleanupReport, DirectoryStatus, RunMode, TracingObserver};
use std::path::{Path, PathBuf};

pub struct CleanupArgs {
    pub dirs: Vec<PathBuf>,
    pub daily_days: Option<u32>,
    pub monthly_months: Option<u32>,
    pub now: Option<String>,
    pub dry_run: bool,
    pub json: bool,
}

pub async fn run(config_path: &Path, args: CleanupArgs) -> Result<()> {
    // 1. Load configuration and apply overrides
    let config = system_config::load(config_path)?;
    let base = config.policy()?;
    let policy = RetentionPolicy::new(
        args.daily_days.unwrap_or(base.daily_days),
        args.monthly_months.unwrap_or(base.monthly_months),
    )
    .context("Invalid retention override")?;

    let now = util::resolve_now(args.now.as_deref())?;

    // 2. Pick directories
    let dirs = if args.dirs.is_empty() {
        config.destinations()
    } else {
        args.dirs
    };

    if dirs.is_empty() {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&CleanupReport {
                mode: mode(args.dry_run),
                now,
                policy,
                directories: Vec::new(),
            })?);
        } else {
            println!("{}", "No backup destinations configured - nothing to clean".dimmed());
            println!(
                "{}",
                "Add [[filesystem]] or [[database]] entries to the config, or pass --dir.".dimmed()
            );
        }
        return Ok(());
    }

    tracing::debug!(
        daily_days = policy.daily_days,
        monthly_months = policy.monthly_months,
        %now,
        "Starting cleanup of {} directories",
        dirs.len()
    );

    // 3. Run
    let observer = TracingObserver;
    let report = Cleanup::new(policy, &observer).mode(mode(args.dry_run)).run(&dirs, now);

    // 4. Display results
    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }

    check_locked(&report)
}

/// Locked directories fail the run; failed deletions and unavailable
/// directories do not
fn check_locked(report: &CleanupReport) -> Result<()> {
    let locked: Vec<_> = report
        .directories
        .iter()
        .filter(|d| d.status == DirectoryStatus::Locked)
        .map(|d| d.directory.display().to_string())
        .collect();
    if !locked.is_empty() {
        anyhow::bail!("Skipped locked directories: {}", locked.join(", "));
    }

    Ok(())
}

fn mode(dry_run: bool) -> RunMode {
    if dry_run {
        RunMode::DryRun
    } else {
        RunMode::Apply
    }
}

fn print_report(report: &CleanupReport) {
    let dry_run = report.mode == RunMode::DryRun;

    if dry_run {
        println!("{}", "Cleanup (dry run)".bold());
    } else {
        println!("{}", "Cleanup".bold());
    }
    println!(
        "{}",
        format!(
            "Keeping {} days of daily backups and {} months of monthly backups, as of {}",
            report.policy.daily_days,
            report.policy.monthly_months,
            util::format_timestamp(report.now)
        )
        .dimmed()
    );
    println!();

    for dir in &report.directories {
        println!("{}", dir.directory.display().to_string().cyan());

        match dir.status {
            DirectoryStatus::Unavailable => {
                println!("  {}", "unavailable - skipped".yellow());
                continue;
            }
            DirectoryStatus::Locked => {
                println!("  {}", "locked by another process - skipped".red());
                continue;
            }
            DirectoryStatus::Cleaned => {}
        }

        for path in &dir.deleted {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            if dry_run {
                println!("  {} {}", "would delete".yellow(), name);
            } else {
                println!("  {} {}", "deleted".red(), name);
            }
        }
        for path in &dir.failed {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            println!("  {} {}", "failed".red().bold(), name);
        }
        println!(
            "  {}",
            format!(
                "{} scanned, {} kept",
                util::count(dir.scanned, "backup"),
                dir.kept
            )
            .dimmed()
        );
    }

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if report.total_deleted() == 0 && report.total_failed() == 0 {
        println!("{}", "Nothing to delete - all backups are within retention".dimmed());
        return;
    }

    let deleted_label = if dry_run { "Would delete:" } else { "Deleted:     " };
    println!("{} {}", deleted_label, report.total_deleted().to_string().yellow());
    println!("Kept:         {}", report.total_kept().to_string().green());
    if report.total_failed() > 0 {
        println!("Failed:       {}", report.total_failed().to_string().red());
    }
    let freed_label = if dry_run { "Would free:  " } else { "Space freed: " };
    println!("{} {}", freed_label, util::format_size(report.bytes_freed()).green());
}
