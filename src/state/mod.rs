//! State module for tracking harvest progress
//!
//! - `CrawlPhase`: where the harvester is (discovering, on a listing page, done)

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
