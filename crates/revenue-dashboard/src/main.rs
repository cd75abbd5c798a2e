//! Subscription Revenue Dashboard
//!
//! Fetches subscription billing records from the spreadsheet endpoint and
//! reports net revenue, goal progress, monthly distribution and recent
//! subscriptions.

mod config;
mod constants;
mod fetch;
mod refresh;
mod reports;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use subscription_revenue::{RefreshOutcome, SnapshotStore};
use tracing_subscriber::EnvFilter;

use config::FileConfig;
use fetch::SnapshotSource;
use reports::DashboardView;

#[derive(Parser, Debug)]
#[command(name = "revenue-dashboard")]
#[command(about = "Subscription revenue, goal progress and recent transactions")]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = constants::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Read subscriptions from a local JSON file instead of the endpoint
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Subscriptions endpoint (overrides config.toml)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Evaluate as of this moment (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, UTC)
    #[arg(long, global = true, value_parser = parse_now)]
    now: Option<NaiveDateTime>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the dashboard summary (default)
    Report,

    /// Write CSV reports
    Export {
        /// Output directory for generated CSV reports
        #[arg(short, long, default_value = constants::DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },

    /// Re-fetch periodically and print the summary after each refresh
    Watch {
        /// Seconds between refreshes
        #[arg(long, default_value_t = constants::DEFAULT_REFRESH_INTERVAL_SECS)]
        interval: u64,

        /// Stop after this many refreshes
        #[arg(long)]
        iterations: Option<u64>,
    },
}

fn parse_now(s: &str) -> std::result::Result<NaiveDateTime, String> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| format!("expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, got '{}'", s))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load config file, or fall back to defaults when the data source is given
/// on the command line
fn load_config_file(path: &Path, source_given: bool) -> Result<FileConfig> {
    if path.exists() {
        return FileConfig::load(path);
    }

    if source_given {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(FileConfig::default());
    }

    anyhow::bail!(
        "Config file '{}' not found.\n\n\
        To get started:\n\
        1. Copy config.toml.example to config.toml\n\
        2. Fill in the subscriptions endpoint\n\n\
        Or pass --endpoint <url> / --input <file.json> directly.",
        path.display()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let source_given = args.input.is_some() || args.endpoint.is_some();
    let file_config = load_config_file(&args.config, source_given)?;
    let config = config::Config::from_file(&file_config, args.endpoint)?;

    let source = match (args.input, &config.endpoint) {
        (Some(path), _) => SnapshotSource::File(path),
        (None, Some(url)) => SnapshotSource::Endpoint(url.clone()),
        (None, None) => anyhow::bail!(
            "No subscriptions source configured. Set [source] endpoint in {} or pass --endpoint / --input.",
            args.config.display()
        ),
    };

    let client = fetch::http_client()?;
    let store = SnapshotStore::new();

    match args.command.unwrap_or(Command::Report) {
        Command::Report => {
            load_once(&store, &source, &client).await?;
            let snapshot = store.current();
            let now = args.now.unwrap_or_else(|| Utc::now().naive_utc());
            reports::print_summary(&DashboardView::build(&snapshot, &config, now));
            Ok(())
        }

        Command::Export { output_dir } => {
            load_once(&store, &source, &client).await?;
            std::fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory: {}", output_dir.display())
            })?;

            let snapshot = store.current();
            let now = args.now.unwrap_or_else(|| Utc::now().naive_utc());
            let view = DashboardView::build(&snapshot, &config, now);

            println!("Generating reports...");
            reports::generate_all_reports(&output_dir, &view)?;
            println!("\nReports written to {}", output_dir.display());
            Ok(())
        }

        Command::Watch {
            interval,
            iterations,
        } => {
            if interval == 0 {
                anyhow::bail!("--interval must be at least 1 second");
            }
            println!("Watching {} every {}s (Ctrl-C to stop)", source, interval);

            let options = refresh::WatchOptions {
                interval: Duration::from_secs(interval),
                iterations,
                now: args.now,
            };
            refresh::watch(&store, &source, &client, &config, &options).await
        }
    }
}

/// Single refresh for one-shot commands; any failure is fatal
async fn load_once(
    store: &SnapshotStore,
    source: &SnapshotSource,
    client: &reqwest::Client,
) -> Result<()> {
    match refresh::refresh(store, source, client)
        .await
        .with_context(|| format!("Failed to load subscriptions from {}", source))?
    {
        RefreshOutcome::Committed { .. } => Ok(()),
        RefreshOutcome::Superseded { .. } => anyhow::bail!("Refresh was superseded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_now() {
        let date_only = parse_now("2025-03-01").unwrap();
        assert_eq!(date_only.to_string(), "2025-03-01 00:00:00");

        let with_time = parse_now("2025-03-01T14:30:00").unwrap();
        assert_eq!(with_time.to_string(), "2025-03-01 14:30:00");

        assert!(parse_now("March 1st").is_err());
    }

    #[test]
    fn test_missing_config_allowed_with_explicit_source() {
        let path = Path::new("/nonexistent/config.toml");
        assert!(load_config_file(path, true).is_ok());
        assert!(load_config_file(path, false).is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let args = Args::try_parse_from([
            "revenue-dashboard",
            "--input",
            "subs.json",
            "export",
            "--output-dir",
            "out",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("subs.json")));
        assert!(matches!(args.command, Some(Command::Export { .. })));

        let args =
            Args::try_parse_from(["revenue-dashboard", "watch", "--iterations", "2"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::Watch {
                interval: constants::DEFAULT_REFRESH_INTERVAL_SECS,
                iterations: Some(2)
            })
        ));
    }
}
