//! Dry-run and status leave the directory untouched

use crate::common::{backup, names, TestEnv};
use crate::ks;
use anyhow::Result;

const NOW: &str = "2024-03-15 12:00:00";

fn populate(env: &TestEnv) -> Result<std::path::PathBuf> {
    let dir = env.destination("www")?;
    env.configure(7, 3, &[&dir])?;
    backup(&dir, "20240314-020000-www.tar.gz")?;
    backup(&dir, "20240215-020000-www.tar.gz")?;
    backup(&dir, "20240201-020000-www.tar.gz")?;
    backup(&dir, "20231101-020000-www.tar.gz")?;
    Ok(dir)
}

#[test]
fn test_dry_run_reports_without_deleting() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = populate(&env)?;
    let before = names(&dir)?;

    let result = ks!(env, "cleanup", "--now", NOW, "--dry-run").assert_success()?;
    assert!(result.contains_stdout("dry run"));
    assert!(result.contains_stdout("would delete"));
    assert!(result.contains_stdout("20231101-020000-www.tar.gz"));

    assert_eq!(names(&dir)?, before);

    Ok(())
}

#[test]
fn test_dry_run_json_matches_real_run() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = populate(&env)?;

    let planned = ks!(env, "cleanup", "--now", NOW, "--dry-run", "--json").assert_success()?.json()?;
    assert_eq!(planned["mode"], "dry_run");
    assert!(!dir.join(".keepsake.lock").exists());

    let applied = ks!(env, "cleanup", "--now", NOW, "--json").assert_success()?.json()?;
    assert_eq!(applied["mode"], "apply");
    assert_eq!(planned["directories"][0]["deleted"], applied["directories"][0]["deleted"]);
    assert_eq!(planned["directories"][0]["kept"], applied["directories"][0]["kept"]);
    assert_eq!(applied["policy"]["daily_days"], 7);
    assert_eq!(applied["policy"]["monthly_months"], 3);

    assert_eq!(
        names(&dir)?,
        vec!["20240201-020000-www.tar.gz", "20240314-020000-www.tar.gz"]
    );

    Ok(())
}

#[test]
fn test_status_shows_pending_deletions() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = populate(&env)?;
    let before = names(&dir)?;

    let result = ks!(env, "status", "--now", NOW).assert_success()?;
    assert!(result.contains_stdout("4 (2 monthly, 2 daily)"));
    assert!(result.contains_stdout("20240314-020000-www.tar.gz"));
    assert!(result.contains_stdout("would be deleted"));

    assert_eq!(names(&dir)?, before);

    Ok(())
}
