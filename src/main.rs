//! Verse-Harvest main entry point
//!
//! This is the command-line interface for the Verse-Harvest poem harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use verse_harvest::config::{load_config_with_hash, Config};
use verse_harvest::crawler::{discover_total_pages, harvest};
use verse_harvest::output::{load_dataset_stats, print_statistics};
use verse_harvest::storage::{CheckpointStore, JsonCheckpointStore};

/// Verse-Harvest: a resumable poem harvester
///
/// Verse-Harvest walks a paginated poem listing, extracts every linked poem
/// and appends it to a line-delimited JSON dataset. Progress is checkpointed
/// after each listing page; rerunning picks up where the last run stopped.
#[derive(Parser, Debug)]
#[command(name = "verse-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable poem harvester", long_about = None)]
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

    /// Discard the checkpoint and restart ids at 1 (the dataset is kept)
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    fresh: bool,

    /// Validate config, discover the page count and show the checkpoint without harvesting
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show dataset statistics and the checkpoint, then exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config).await
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_harvest(config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("verse_harvest=info,warn"),
            1 => EnvFilter::new("verse_harvest=debug,info"),
            2 => EnvFilter::new("verse_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows configuration, page count and checkpoint
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Verse-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Listing root: {}", config.listing_url(1)?);
    println!("  Page 2: {}", config.listing_url(2)?);
    println!("  Rate limit: {}ms", config.crawler.rate_limit_ms);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent);

    println!("\nSelectors:");
    println!("  Title: {}", config.selectors.title);
    println!("  Author: {}", config.selectors.author);
    println!("  Text: {}", config.selectors.text);
    println!("  Title prefix: {:?}", config.selectors.title_prefix);

    println!("\nOutput:");
    println!("  Dataset: {}", config.output.dataset_path);
    println!("  Checkpoint: {}", config.output.checkpoint_path);

    let checkpoint = JsonCheckpointStore::new(Path::new(&config.output.checkpoint_path)).load();
    let total_pages = discover_total_pages(config)
        .await
        .context("failed to discover listing size")?;

    println!("\n✓ Configuration is valid");
    println!("✓ Listing has {} pages", total_pages);
    if checkpoint.resume_page() > total_pages {
        println!("✓ Checkpoint is past the last page; nothing to harvest");
    } else {
        println!(
            "✓ Would harvest pages {}-{} starting at poem ID {}",
            checkpoint.resume_page(),
            total_pages,
            checkpoint.next_id
        );
    }

    Ok(())
}

/// Handles the --stats mode: shows dataset statistics and the checkpoint
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let dataset = Path::new(&config.output.dataset_path);
    println!("Dataset: {}\n", dataset.display());

    let stats = load_dataset_stats(dataset)
        .with_context(|| format!("failed to read dataset {}", dataset.display()))?;
    print_statistics(&stats);

    let checkpoint = JsonCheckpointStore::new(Path::new(&config.output.checkpoint_path)).load();
    println!("\nCheckpoint:");
    println!("  Last page completed: {}", checkpoint.last_page_completed);
    println!("  Next poem ID: {}", checkpoint.next_id);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh harvest (discarding checkpoint)");
    } else {
        tracing::info!("Starting harvest (will resume from checkpoint if present)");
    }

    let summary = harvest(config, fresh).await.context("harvest failed")?;

    tracing::info!(
        "Scraping complete: {} poems harvested, {} links skipped, next poem ID {}",
        summary.records_harvested,
        summary.links_skipped,
        summary.checkpoint.next_id
    );
    Ok(())
}
