//! Seed a directory with synthetic history, then clean it

use crate::common::{names, TestEnv};
use crate::ks;
use anyhow::Result;
use retention::{CleanupLock, LOCK_FILE_NAME};

const NOW: &str = "2024-03-15 02:00:00";

fn seed(env: &TestEnv, dir: &str) -> Result<()> {
    ks!(
        env, "seed", dir, "--days", "45", "--monthly-months", "14", "--slug", "www", "--now", NOW
    )
    .assert_success()?;
    Ok(())
}

#[test]
fn test_seed_writes_daily_and_monthly_history() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = env.root().join("backups");
    let dir_str = dir.to_string_lossy().to_string();

    seed(&env, &dir_str)?;

    let files = names(&dir)?;
    // 45 days from Jan 31 to Mar 15, plus first-of-month back to Feb 2023,
    // with Feb 1 and Mar 1 shared between the two
    assert_eq!(files.len(), 57);
    assert!(files.contains(&"20240315-020000-www.tar.gz".to_string()));
    assert!(files.contains(&"20240131-020000-www.tar.gz".to_string()));
    assert!(files.contains(&"20230201-020000-www.tar.gz".to_string()));
    assert!(!files.iter().any(|f| f.ends_with(".partial")));
    assert!(!files.contains(&LOCK_FILE_NAME.to_string()));

    Ok(())
}

#[test]
fn test_seed_refuses_locked_directory() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = env.destination("backups")?;
    let dir_str = dir.to_string_lossy().to_string();

    let held = CleanupLock::acquire(&dir)?;
    let result = ks!(env, "seed", &dir_str, "--days", "3", "--now", NOW).assert_failure()?;
    assert!(result.contains_stderr("held by another keepsake process"));
    assert_eq!(names(&dir)?, vec![LOCK_FILE_NAME]);

    held.release()?;
    seed(&env, &dir_str)?;
    assert_eq!(names(&dir)?.len(), 57);

    Ok(())
}

#[test]
fn test_cleanup_after_seed() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = env.root().join("backups");
    let dir_str = dir.to_string_lossy().to_string();

    seed(&env, &dir_str)?;

    let result = ks!(
        env, "cleanup", "--dir", &dir_str, "--daily-days", "7", "--monthly-months", "3", "--now", NOW,
        "--json"
    )
    .assert_success()?;

    let report = result.json()?;
    assert_eq!(report["mode"], "apply");
    assert_eq!(report["directories"][0]["status"], "cleaned");
    assert_eq!(report["directories"][0]["scanned"], 57);
    assert_eq!(report["directories"][0]["deleted"].as_array().map(Vec::len), Some(45));

    let expected = vec![
        "20231201-020000-www.tar.gz",
        "20240101-020000-www.tar.gz",
        "20240201-020000-www.tar.gz",
        "20240301-020000-www.tar.gz",
        "20240308-020000-www.tar.gz",
        "20240309-020000-www.tar.gz",
        "20240310-020000-www.tar.gz",
        "20240311-020000-www.tar.gz",
        "20240312-020000-www.tar.gz",
        "20240313-020000-www.tar.gz",
        "20240314-020000-www.tar.gz",
        "20240315-020000-www.tar.gz",
    ];
    assert_eq!(names(&dir)?, expected);

    Ok(())
}

#[test]
fn test_second_cleanup_deletes_nothing() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = env.root().join("backups");
    let dir_str = dir.to_string_lossy().to_string();

    seed(&env, &dir_str)?;

    let cleanup = || {
        ks!(env, "cleanup", "--dir", &dir_str, "--now", NOW, "--json").assert_success()
    };

    let first = cleanup()?.json()?;
    assert!(first["directories"][0]["deleted"].as_array().map_or(0, Vec::len) > 0);
    let after_first = names(&dir)?;

    let second = cleanup()?.json()?;
    assert_eq!(second["directories"][0]["deleted"].as_array().map(Vec::len), Some(0));
    assert_eq!(names(&dir)?, after_first);

    Ok(())
}

#[test]
fn test_seed_sql_kind() -> Result<()> {
    let env = TestEnv::new()?;
    let dir = env.root().join("dumps");
    let dir_str = dir.to_string_lossy().to_string();

    ks!(env, "seed", &dir_str, "--days", "3", "--monthly-months", "0", "--kind", "sql", "--now", NOW)
        .assert_success()?;

    assert_eq!(
        names(&dir)?,
        vec![
            "20240313-020000-seed.sql.gz",
            "20240314-020000-seed.sql.gz",
            "20240315-020000-seed.sql.gz",
        ]
    );

    ks!(env, "seed", &dir_str, "--kind", "zip", "--now", NOW).assert_failure()?;

    Ok(())
}
