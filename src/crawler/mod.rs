//! Crawler module for listing and detail page harvesting
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching
//! - Listing page parsing (page count, detail links)
//! - Detail page extraction
//! - Fixed-delay rate limiting
//! - The resumable harvest driver

mod coordinator;
mod detail;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{HarvestSummary, Harvested, Harvester, LinkFailure};
pub use detail::DetailExtractor;
pub use fetcher::{build_http_client, Fetcher};
pub use parser::{extract_links, LinkFilter, PageCountParser, SlugLinkFilter};
pub use scheduler::RateLimiter;

use crate::config::Config;
use crate::output::JsonlSink;
use crate::storage::{CheckpointStore, JsonCheckpointStore};
use crate::HarvestError;
use std::path::Path;

/// Runs a complete harvest
///
/// This is the main entry point for starting a harvest. It will:
/// 1. Open the checkpoint (clearing it first if `fresh`)
/// 2. Open the dataset for appending
/// 3. Discover the number of listing pages
/// 4. Harvest every remaining page, checkpointing after each
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `fresh` - Discard the checkpoint and restart ids at 1
///
/// # Example
///
/// ```no_run
/// use verse_harvest::config::load_config;
/// use verse_harvest::crawler::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let summary = harvest(config, false).await?;
/// println!("{} poems", summary.records_harvested);
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: Config, fresh: bool) -> Result<HarvestSummary, HarvestError> {
    let mut checkpoints = JsonCheckpointStore::new(Path::new(&config.output.checkpoint_path));
    if fresh {
        checkpoints.clear()?;
    }

    let mut sink = JsonlSink::open(Path::new(&config.output.dataset_path))?;
    let mut harvester = Harvester::new(config, Box::new(checkpoints))?;
    harvester.run(&mut sink).await
}

/// Fetches the listing root and returns the number of listing pages
///
/// Used for dry runs; nothing is written.
pub async fn discover_total_pages(config: &Config) -> Result<u32, HarvestError> {
    let fetcher = Fetcher::new(&config.user_agent)?;
    let root = config.listing_url(1)?;
    let html = fetcher.fetch_html(&root).await?;
    Ok(PageCountParser::new().total_pages(&html))
}
