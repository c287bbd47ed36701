//! Harvest coordinator - the pagination and extraction state machine
//!
//! This module contains the driver that coordinates a harvest:
//! - Discovering the number of listing pages and reading the checkpoint
//! - Walking listing pages in ascending order from the checkpoint
//! - Fetching each candidate detail link and extracting a record
//! - Assigning sequential poem ids
//! - Saving the checkpoint once a listing page is exhausted
//!
//! Records are pulled one at a time through `Harvester::next_record`. A
//! failure on a single detail link is reported as `Harvested::Skipped` and
//! does not consume an id; listing page and checkpoint failures end the
//! harvest with an error.

use crate::config::Config;
use crate::crawler::detail::DetailExtractor;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{extract_links, LinkFilter, PageCountParser, SlugLinkFilter};
use crate::crawler::scheduler::RateLimiter;
use crate::output::{PoemRecord, RecordSink};
use crate::state::CrawlPhase;
use crate::storage::{Checkpoint, CheckpointStore};
use crate::url::resolve_detail_url;
use crate::HarvestError;
use std::collections::VecDeque;
use url::Url;

/// A detail link that could not be turned into a record
#[derive(Debug)]
pub struct LinkFailure {
    /// The decoded link as found on the listing page
    pub link: String,

    /// The listing page the link came from
    pub page: u32,

    /// Why the link was skipped
    pub error: HarvestError,
}

/// One item pulled from the harvester
#[derive(Debug)]
pub enum Harvested {
    /// A successfully extracted poem
    Record(PoemRecord),

    /// A detail link that failed and was skipped
    Skipped(LinkFailure),
}

/// Totals for a harvest invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Total listing pages discovered
    pub total_pages: u32,

    /// Listing pages completed and checkpointed during this invocation
    pub pages_completed: u32,

    /// Records produced during this invocation
    pub records_harvested: u64,

    /// Detail links skipped after a failure
    pub links_skipped: u64,

    /// The last checkpoint written (or loaded, if no page completed)
    pub checkpoint: Checkpoint,
}

/// Pull-based harvest driver
pub struct Harvester {
    config: Config,
    base_url: Url,
    fetcher: Fetcher,
    page_counter: PageCountParser,
    link_filter: Box<dyn LinkFilter>,
    extractor: DetailExtractor,
    checkpoints: Box<dyn CheckpointStore>,
    limiter: RateLimiter,
    phase: CrawlPhase,
    next_id: u64,
    pending_links: VecDeque<String>,
    page_loaded: bool,
    summary: HarvestSummary,
}

impl Harvester {
    /// Creates a new harvester
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `checkpoints` - Where progress is read from and saved to
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to `discover()`
    /// * `Err(HarvestError)` - The base URL, selectors or HTTP client are unusable
    pub fn new(config: Config, checkpoints: Box<dyn CheckpointStore>) -> Result<Self, HarvestError> {
        let base_url = config.base_url()?;
        let fetcher = Fetcher::new(&config.user_agent)?;
        let extractor = DetailExtractor::new(&config.selectors)?;
        let link_filter = Box::new(SlugLinkFilter::new(&config.site.base_url));
        let limiter = RateLimiter::from_millis(config.crawler.rate_limit_ms);

        Ok(Self {
            config,
            base_url,
            fetcher,
            page_counter: PageCountParser::new(),
            link_filter,
            extractor,
            checkpoints,
            limiter,
            phase: CrawlPhase::Discovering,
            next_id: 1,
            pending_links: VecDeque::new(),
            page_loaded: false,
            summary: HarvestSummary::default(),
        })
    }

    /// Replaces the detail link heuristic
    pub fn with_link_filter(mut self, filter: Box<dyn LinkFilter>) -> Self {
        self.link_filter = filter;
        self
    }

    /// Where the harvest currently is
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// The id the next successful record will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Totals so far
    pub fn summary(&self) -> HarvestSummary {
        self.summary
    }

    /// Discovers the total page count and loads the checkpoint
    ///
    /// Called automatically by the first `next_record`. Fails only if the
    /// listing root cannot be fetched.
    pub async fn discover(&mut self) -> Result<CrawlPhase, HarvestError> {
        if self.phase != CrawlPhase::Discovering {
            return Ok(self.phase);
        }

        let root = self.config.listing_url(1)?;
        tracing::info!("Discovering listing size from {}", root);
        let html = self.fetcher.fetch_html(&root).await?;
        let total_pages = self.page_counter.total_pages(&html);
        self.limiter.wait().await;

        let checkpoint = self.checkpoints.load();
        self.next_id = checkpoint.next_id;
        self.summary.total_pages = total_pages;
        self.summary.checkpoint = checkpoint;

        let start_page = checkpoint.resume_page();
        if start_page > total_pages {
            tracing::info!(
                "Checkpoint is at page {} of {}, nothing left to harvest",
                checkpoint.last_page_completed,
                total_pages
            );
            self.enter(CrawlPhase::Done);
        } else {
            self.enter(CrawlPhase::Paging {
                page: start_page,
                total_pages,
            });
        }

        Ok(self.phase)
    }

    /// Pulls the next item from the harvest
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Harvested::Record))` - A poem with the next sequential id
    /// * `Ok(Some(Harvested::Skipped))` - A detail link failed; keep pulling
    /// * `Ok(None)` - Every listing page has been processed
    /// * `Err(HarvestError)` - Discovery, a listing page, or a checkpoint
    ///   save failed; the harvest cannot continue
    pub async fn next_record(&mut self) -> Result<Option<Harvested>, HarvestError> {
        loop {
            match self.phase {
                CrawlPhase::Discovering => {
                    self.discover().await?;
                }
                CrawlPhase::Done => return Ok(None),
                CrawlPhase::Paging { page, total_pages } => {
                    if !self.page_loaded {
                        self.load_listing_page(page).await?;
                    }

                    if let Some(link) = self.pending_links.pop_front() {
                        return Ok(Some(self.harvest_link(page, link).await));
                    }

                    self.complete_page(page, total_pages).await?;
                }
            }
        }
    }

    /// Runs the harvest to completion, emitting every record to `sink`
    ///
    /// A sink failure stops the harvest before the current page is
    /// checkpointed, so the page is redone on the next invocation.
    pub async fn run(&mut self, sink: &mut dyn RecordSink) -> Result<HarvestSummary, HarvestError> {
        while let Some(item) = self.next_record().await? {
            match item {
                Harvested::Record(record) => sink.emit(&record)?,
                Harvested::Skipped(_) => {}
            }
        }

        tracing::info!(
            "Harvest complete: {} records, {} links skipped, {} pages",
            self.summary.records_harvested,
            self.summary.links_skipped,
            self.summary.pages_completed
        );
        Ok(self.summary)
    }

    async fn load_listing_page(&mut self, page: u32) -> Result<(), HarvestError> {
        let url = self.config.listing_url(page)?;
        tracing::info!("Processing listing page: {}", url);

        let html = self.fetcher.fetch_html(&url).await?;
        let links = extract_links(&html, self.link_filter.as_ref());
        tracing::info!("Found {} candidate links on page {}", links.len(), page);

        self.pending_links = links.into();
        self.page_loaded = true;
        Ok(())
    }

    async fn harvest_link(&mut self, page: u32, link: String) -> Harvested {
        let result = self.fetch_record(&link).await;
        self.limiter.wait().await;

        match result {
            Ok(record) => {
                tracing::debug!("Harvested poem {}: {}", record.id, record.title);
                self.next_id += 1;
                self.summary.records_harvested += 1;
                Harvested::Record(record)
            }
            Err(error) => {
                tracing::warn!("Error processing {}: {}", link, error);
                self.summary.links_skipped += 1;
                Harvested::Skipped(LinkFailure { link, page, error })
            }
        }
    }

    async fn fetch_record(&self, link: &str) -> Result<PoemRecord, HarvestError> {
        let url = resolve_detail_url(&self.base_url, link)?;
        let html = self.fetcher.fetch_html(&url).await?;
        Ok(self.extractor.extract(&html, self.next_id))
    }

    async fn complete_page(&mut self, page: u32, total_pages: u32) -> Result<(), HarvestError> {
        let checkpoint = Checkpoint::new(page, self.next_id);
        self.checkpoints.save(&checkpoint)?;
        self.summary.checkpoint = checkpoint;
        self.summary.pages_completed += 1;
        self.page_loaded = false;

        self.limiter.wait().await;

        if page < total_pages {
            self.enter(CrawlPhase::Paging {
                page: page + 1,
                total_pages,
            });
        } else {
            tracing::info!("All pages processed.");
            self.enter(CrawlPhase::Done);
        }
        Ok(())
    }

    fn enter(&mut self, next: CrawlPhase) {
        debug_assert!(
            self.phase.can_transition_to(&next),
            "invalid phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::debug!("Phase {} -> {}", self.phase, next);
        self.phase = next;
    }
}
