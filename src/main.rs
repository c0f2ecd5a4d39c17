//! Betteridge-Crawl main entry point
//!
//! This is the command-line interface for the Betteridge-Crawl headline crawler.

use anyhow::Context;
use betteridge_crawl::config::{load_config_with_hash, Config};
use betteridge_crawl::crawler::{crawl, SiteReport};
use betteridge_crawl::output::{load_statistics, print_statistics};
use betteridge_crawl::{LoadMode, SiteRegistry, SnapshotStore};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Betteridge-Crawl: headline discovery for news sites
///
/// Betteridge-Crawl explores each configured news site, collects the titles
/// of the article pages it finds, and keeps a resumable snapshot per site.
#[derive(Parser, Debug)]
#[command(name = "betteridge-crawl")]
#[command(version)]
#[command(about = "Collects article headlines from news sites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start every site from its root, ignoring saved snapshots
    #[arg(long, conflicts_with = "reconcile_with")]
    fresh: bool,

    /// Reconcile articles against a previous run's state directory before crawling
    #[arg(long, value_name = "DIR", conflicts_with = "fresh")]
    reconcile_with: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the saved snapshots and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(ExitCode::SUCCESS);
    }
    if cli.stats {
        handle_stats(&config)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mode = if cli.fresh {
        LoadMode::Fresh
    } else if let Some(dir) = cli.reconcile_with {
        LoadMode::Reconcile {
            previous: SnapshotStore::new(dir),
        }
    } else {
        LoadMode::Resume
    };

    handle_crawl(config, mode).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("betteridge_crawl=info,warn"),
            1 => EnvFilter::new("betteridge_crawl=debug,info"),
            2 => EnvFilter::new("betteridge_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let registry = SiteRegistry::from_ids(config.sites.as_slice())
        .context("invalid site selection")?;

    println!("=== Betteridge-Crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Article target: {}", config.crawler.article_target);
    println!(
        "  Checkpoint interval: {} URLs",
        config.crawler.checkpoint_interval
    );
    println!(
        "  Max concurrent sites: {}",
        config.crawler.max_concurrent_sites
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  State directory: {}", config.output.state_dir);

    println!("\nSites ({}):", registry.len());
    for policy in registry.policies() {
        println!("  - {} ({})", policy.id(), policy.root_url());
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the saved snapshots
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let registry = SiteRegistry::from_ids(config.sites.as_slice())
        .context("invalid site selection")?;
    let store = SnapshotStore::new(&config.output.state_dir);

    println!("State directory: {}\n", config.output.state_dir);
    print_statistics(&load_statistics(&store, registry.policies()));

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, mode: LoadMode) -> anyhow::Result<ExitCode> {
    match &mode {
        LoadMode::Resume => tracing::info!("Starting crawl (resuming saved snapshots)"),
        LoadMode::Fresh => tracing::info!("Starting fresh crawl (ignoring saved snapshots)"),
        LoadMode::Reconcile { previous } => tracing::info!(
            "Starting crawl, reconciling against {}",
            previous.dir().display()
        ),
    }

    let reports = crawl(config, mode).await.context("crawl could not start")?;
    print_reports(&reports);

    if reports.iter().all(SiteReport::is_success) {
        tracing::info!("Crawl completed successfully");
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!("One or more sites failed");
        Ok(ExitCode::FAILURE)
    }
}

fn print_reports(reports: &[SiteReport]) {
    println!("\n=== Crawl Results ===\n");
    for report in reports {
        match &report.outcome {
            Ok(crawl) => println!(
                "  {}: {} ({} articles, {} visited, {} in frontier, {} fetch failures, {:.1}s)",
                report.site,
                crawl.status,
                crawl.articles,
                crawl.visited,
                crawl.frontier,
                crawl.fetch_failures,
                crawl.elapsed.as_secs_f64()
            ),
            Err(e) => println!("  {}: failed ({})", report.site, e),
        }
    }
}
