//! Show backups per destination

use anyhow::Result;
use cli_lib::system_config;
use cli_lib::util;
use keepsake_core::Tier;
use owo_colors::OwoColorize;
use retention::{evaluate, resolve_destinations, scan, TracingObserver};
use std::path::{Path, PathBuf};

pub async fn run(config_path: &Path, dirs: &[PathBuf], now: Option<&str>) -> Result<()> {
    let config = system_config::load(config_path)?;
    let policy = config.policy()?;
    let now = util::resolve_now(now)?;

    let dirs = if dirs.is_empty() {
        config.destinations()
    } else {
        resolve_destinations(dirs)
    };

    println!("{}", "Keepsake Status".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Retention:   {} days daily, {} months monthly",
        policy.daily_days.to_string().cyan(),
        policy.monthly_months.to_string().cyan()
    );
    println!("Config:      {}", config_path.display().to_string().dimmed());

    if dirs.is_empty() {
        println!();
        println!("{}", "No backup destinations configured".dimmed());
        return Ok(());
    }

    let observer = TracingObserver;

    for dir in &dirs {
        println!();
        println!("{}", dir.display().to_string().cyan().bold());

        if !dir.is_dir() {
            println!("  {}", "unavailable".yellow());
            continue;
        }

        let records = scan(dir, &observer);
        if records.is_empty() {
            println!("  {}", "no backups".dimmed());
            continue;
        }

        let monthly = records.iter().filter(|r| r.tier == Tier::Monthly).count();
        let total_size: u64 = records.iter().map(|r| r.size).sum();
        let plan = evaluate(&records, &policy, now);

        println!(
            "  Backups:     {} ({} monthly, {} daily)",
            records.len(),
            monthly,
            records.len() - monthly
        );
        if let Some(newest) = records.iter().max_by_key(|r| r.timestamp) {
            println!(
                "  Newest:      {} {}",
                newest.filename,
                format!("({})", util::format_age(now, newest.timestamp)).dimmed()
            );
        }
        if let Some(oldest) = records.iter().min_by_key(|r| r.timestamp) {
            println!(
                "  Oldest:      {} {}",
                oldest.filename,
                format!("({})", util::format_age(now, oldest.timestamp)).dimmed()
            );
        }
        println!("  Total size:  {}", util::format_size(total_size));

        if plan.delete_count() == 0 {
            println!("  Cleanup:     {}", "nothing to delete".green());
        } else {
            println!(
                "  Cleanup:     {} would be deleted",
                util::count(plan.delete_count(), "backup").yellow()
            );
        }
    }

    Ok(())
}
