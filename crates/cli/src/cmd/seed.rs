//! Populate a directory with synthetic backups

use anyhow::{Context, Result};
use cli_lib::util;
use indicatif::{ProgressBar, ProgressStyle};
use keepsake_core::{synthetic_stamps, write_placeholder_archive, ArchiveKind, BackupName, Tier};
use owo_colors::OwoColorize;
use retention::CleanupLock;
use std::path::Path;

pub async fn run(
    dir: &Path,
    days: u32,
    monthly_months: u32,
    slug: &str,
    kind: &str,
    now: Option<&str>,
) -> Result<()> {
    let kind: ArchiveKind = kind.parse()?;
    let now = util::resolve_now(now)?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    // Keep a concurrent cleanup out while archives are being written
    let lock = CleanupLock::acquire(dir).context("Cannot seed directory")?;

    let stamps = synthetic_stamps(now, days, monthly_months);

    let pb = ProgressBar::new(stamps.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let mut monthly = 0usize;
    for stamp in &stamps {
        let name = BackupName::new(kind, *stamp, Some(slug))?;
        if name.tier() == Tier::Monthly {
            monthly += 1;
        }

        let payload = format!("keepsake placeholder archive {}\n", name);
        let path = write_placeholder_archive(dir, &name, payload.as_bytes())?;
        tracing::debug!("Wrote {}", path.display());

        pb.set_message(name.to_string());
        pb.inc(1);
    }
    pb.finish_and_clear();
    lock
        .release()
        .with_context(|| format!("Failed to remove lock file in {}", dir.display()))?;

    println!(
        "{} Wrote {} to {} ({} monthly, {} daily)",
        "✓".green(),
        util::count(stamps.len(), "archive"),
        dir.display().to_string().cyan(),
        monthly,
        stamps.len() - monthly
    );
    println!(
        "{}",
        format!("Newest: {}", stamps.last().map(|ts| util::format_timestamp(*ts)).unwrap_or_default()).dimmed()
    );

    Ok(())
}
