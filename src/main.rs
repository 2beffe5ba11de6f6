//! Sumi-Fetch main entry point
//!
//! This is the command-line interface for the Sumi-Fetch batch fetcher.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use sumi_fetch::config::{load_config_with_hash, validate, Config};
use sumi_fetch::output::{format_record, print_statistics, BatchStatistics};
use sumi_fetch::url::validator_from_config;
use sumi_fetch::{Fetcher, ReqwestClient, WorkerPool};
use tracing_subscriber::EnvFilter;

/// Sumi-Fetch: a concurrent batch URL fetcher
///
/// Sumi-Fetch validates every URL, fetches the accepted ones over a fixed
/// pool of workers, and prints one line per URL followed by a summary.
#[derive(Parser, Debug)]
#[command(name = "sumi-fetch")]
#[command(version)]
#[command(about = "A concurrent batch URL fetcher", long_about = None)]
struct Cli {
    /// URLs to fetch
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// File with one URL per line ('#' starts a comment)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of parallel workers (overrides the config file)
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Cancel the batch after this many milliseconds (overrides the config file)
    #[arg(long, value_name = "MS")]
    deadline_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    let mut urls = cli.urls.clone();
    if let Some(path) = &cli.input {
        urls.extend(read_url_file(path)?);
    }
    if urls.is_empty() {
        bail!("no URLs given; pass them as arguments or with --input");
    }

    tracing::info!(
        "Fetching {} URLs with {} workers",
        urls.len(),
        config.fetcher.concurrency
    );

    let client = ReqwestClient::from_config(&config.user_agent, &config.fetcher)
        .context("failed to build HTTP client")?;
    let validator = validator_from_config(&config.validator);
    let fetcher = Fetcher::from_shared(Arc::new(client), Arc::from(validator))
        .with_max_body_bytes(config.fetcher.max_body_bytes);
    let pool = WorkerPool::from_config(Arc::new(fetcher), &config.fetcher)?;

    let mut stream = pool.spawn(urls);
    let mut records = Vec::new();
    while let Some(record) = stream.next().await {
        if !cli.quiet {
            println!("{}", format_record(&record));
        }
        records.push(record);
    }
    let report = stream.finish().await;

    if !cli.quiet {
        println!();
        print_statistics(&BatchStatistics::from_report(&records, &report));
    }

    if !report.is_complete() {
        bail!(
            "batch incomplete: {} of {} URLs reported",
            report.received,
            report.submitted
        );
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_fetch=info,warn"),
            1 => EnvFilter::new("sumi_fetch=debug,info"),
            2 => EnvFilter::new("sumi_fetch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.fetcher.concurrency = concurrency;
    }
    if let Some(deadline) = cli.deadline_ms {
        config.fetcher.batch_deadline_ms = Some(deadline);
    }

    validate(&config).context("invalid configuration")?;
    if let Some(deadline) = config.fetcher.batch_deadline_ms {
        tracing::debug!("Batch deadline: {:?}", Duration::from_millis(deadline));
    }

    Ok(config)
}

/// Reads URLs from a file, one per line, skipping blanks and comments
fn read_url_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read URL list {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
