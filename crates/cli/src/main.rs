//! Keepsake CLI - ks command

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use cli_lib::{logging, system_config};
use std::path::PathBuf;

mod cmd;

/// Keepsake - Timestamped backups with two-tier retention
#[derive(Parser)]
#[command(name = "ks")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(long, global = true, env = "KS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete backups that fall outside the retention windows
    Cleanup {
        /// Clean this directory instead of the configured destinations (repeatable)
        #[arg(long = "dir", value_name = "PATH")]
        dirs: Vec<PathBuf>,
        /// Override the daily retention window (days)
        #[arg(long)]
        daily_days: Option<u32>,
        /// Override the monthly retention window (calendar months)
        #[arg(long)]
        monthly_months: Option<u32>,
        /// Evaluate as of this local time ("YYYY-MM-DD HH:MM:SS" or "YYYY-MM-DD")
        #[arg(long, value_name = "TS")]
        now: Option<String>,
        /// Report what would be deleted without deleting anything
        #[arg(long)]
        dry_run: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fill a directory with placeholder archives carrying synthetic timestamps
    Seed {
        /// Target directory (created if missing)
        dir: PathBuf,
        /// Number of daily archives going back from now
        #[arg(long, default_value = "45")]
        days: u32,
        /// Number of first-of-month archives going back from now
        #[arg(long, default_value = "14")]
        monthly_months: u32,
        /// Filename slug
        #[arg(long, default_value = "seed")]
        slug: String,
        /// Archive kind: tar or sql
        #[arg(long, default_value = "tar")]
        kind: String,
        /// Generate relative to this local time
        #[arg(long, value_name = "TS")]
        now: Option<String>,
    },
    /// Show backups per destination and what cleanup would remove
    Status {
        /// Inspect this directory instead of the configured destinations (repeatable)
        #[arg(long = "dir", value_name = "PATH")]
        dirs: Vec<PathBuf>,
        /// Evaluate as of this local time
        #[arg(long, value_name = "TS")]
        now: Option<String>,
    },
    /// View and edit configuration
    #[command(group(ArgGroup::new("action").required(true)))]
    Config {
        /// List all configuration values
        #[arg(long, group = "action")]
        list: bool,
        /// Print a single value
        #[arg(long, value_name = "KEY", group = "action")]
        get: Option<String>,
        /// Set a value
        #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"], group = "action")]
        set: Option<Vec<String>>,
        /// Print the config file path
        #[arg(long, group = "action")]
        path: bool,
        /// With --path, write the example config if no file exists
        #[arg(long, requires = "path")]
        create: bool,
        /// Print an example configuration
        #[arg(long, group = "action")]
        example: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = system_config::resolve_path(cli.config.as_deref())?;

    // Config errors surface from the command itself, after logging is up
    let log_dir = system_config::load(&config_path)
        .ok()
        .and_then(|config| config.logging.directory);
    let _guard = logging::init(cli.verbose, log_dir.as_deref())?;

    match cli.command {
        Commands::Cleanup { dirs, daily_days, monthly_months, now, dry_run, json } => {
            let args = cmd::cleanup::CleanupArgs {
                dirs,
                daily_days,
                monthly_months,
                now,
                dry_run,
                json,
            };
            cmd::cleanup::run(&config_path, args).await
        }
        Commands::Seed { dir, days, monthly_months, slug, kind, now } => {
            cmd::seed::run(&dir, days, monthly_months, &slug, &kind, now.as_deref()).await
        }
        Commands::Status { dirs, now } => cmd::status::run(&config_path, &dirs, now.as_deref()).await,
        Commands::Config { list, get, set, path, create, example } => {
            if list {
                cmd::config::run_list(&config_path).await
            } else if let Some(key) = get {
                cmd::config::run_get(&config_path, &key).await
            } else if let Some([key, value]) = set.as_deref() {
                cmd::config::run_set(&config_path, key, value).await
            } else if path {
                cmd::config::run_path(&config_path, create).await
            } else if example {
                cmd::config::run_example().await
            } else {
                anyhow::bail!("No config action given. See 'ks config --help'.")
            }
        }
    }
}
