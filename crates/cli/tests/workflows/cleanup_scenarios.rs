//! Cleanup against configured destinations

use crate::common::{backup, backup_at, names, ts, TestEnv};
use crate::ks;
use anyhow::Result;
use retention::CleanupLock;

const NOW: &str = "2024-03-15 12:00:00";

#[test]
fn test_reference_scenario() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = env.destination("www")?;
    env.configure(7, 3, &[&dir])?;

    for name in [
        "20240314-020000-www.tar.gz",
        "20240301-020000-www.tar.gz",
        "20240201-020000-www.tar.gz",
        "20240215-020000-www.tar.gz",
        "20231101-020000-www.tar.gz",
        "20240115-020000-www.tar.gz",
    ] {
        backup(&dir, name)?;
    }

    let result = ks!(env, "cleanup", "--now", NOW).assert_success()?;
    assert!(result.contains_stdout("20240215-020000-www.tar.gz"));
    assert!(result.contains_stdout("20231101-020000-www.tar.gz"));

    assert_eq!(
        names(&dir)?,
        vec![
            "20240115-020000-www.tar.gz",
            "20240201-020000-www.tar.gz",
            "20240301-020000-www.tar.gz",
            "20240314-020000-www.tar.gz",
        ]
    );

    Ok(())
}

#[test]
fn test_shared_destination_cleaned_once() -> Result<()> {
    let env = TestEnv::new()?;
    let shared = env.destination("shared")?;
    let other = env.destination("other")?;
    env.configure(7, 3, &[&shared, &other, &shared])?;

    backup(&shared, "20231101-020000-fs0.tar.gz")?;
    backup(&other, "20231101-020000-db1.sql.gz")?;

    let report = ks!(env, "cleanup", "--now", NOW, "--json").assert_success()?.json()?;
    let dirs = report["directories"].as_array().cloned().unwrap_or_default();
    assert_eq!(dirs.len(), 2);
    assert_eq!(dirs[0]["deleted"].as_array().map(Vec::len), Some(1));
    assert_eq!(dirs[1]["deleted"].as_array().map(Vec::len), Some(1));

    assert!(names(&shared)?.is_empty());
    assert!(names(&other)?.is_empty());

    Ok(())
}

#[test]
fn test_lone_daily_promoted_for_month() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = env.destination("db")?;
    env.configure(7, 3, &[&dir])?;

    backup(&dir, "20240205-020000-app.sql.gz")?;
    backup(&dir, "20240220-020000-app.sql.gz")?;
    backup(&dir, "20240210-020000-app.sql.gz")?;

    ks!(env, "cleanup", "--now", NOW).assert_success()?;

    assert_eq!(names(&dir)?, vec!["20240220-020000-app.sql.gz"]);

    Ok(())
}

#[test]
fn test_mtime_decides_age() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = env.destination("www")?;
    env.configure(7, 3, &[&dir])?;

    // Named as recent, but written long ago
    backup_at(&dir, "20240314-020000-www.tar.gz", ts("2023-06-10 02:00:00"))?;
    // Named as old, but touched yesterday
    backup_at(&dir, "20230610-020000-www.tar.gz", ts("2024-03-14 02:00:00"))?;

    ks!(env, "cleanup", "--now", NOW).assert_success()?;

    assert_eq!(names(&dir)?, vec!["20230610-020000-www.tar.gz"]);

    Ok(())
}

#[test]
fn test_locked_directory_is_skipped() -> Result<()> {
    let env = TestEnv::new()?;
    let locked = env.destination("locked")?;
    let free = env.destination("free")?;
    env.configure(7, 3, &[&locked, &free])?;

    backup(&locked, "20231101-020000-fs0.tar.gz")?;
    backup(&free, "20231101-020000-fs1.tar.gz")?;

    let lock = CleanupLock::acquire(&locked)?;

    let result = ks!(env, "cleanup", "--now", NOW).assert_failure()?;
    assert!(result.contains_stderr("locked"));

    assert_eq!(names(&locked)?, vec![".keepsake.lock", "20231101-020000-fs0.tar.gz"]);
    assert!(names(&free)?.is_empty());

    lock.release()?;
    ks!(env, "cleanup", "--now", NOW).assert_success()?;
    assert!(names(&locked)?.is_empty());

    Ok(())
}

#[test]
fn test_no_destinations_configured() -> Result<()> {
    let env = TestEnv::new()?;

    let result = ks!(env, "cleanup", "--now", NOW).assert_success()?;
    assert!(result.contains_stdout("nothing to clean"));

    Ok(())
}
