//! Output module for the poem dataset
//!
//! This module handles:
//! - The `PoemRecord` written for every harvested poem
//! - Appending records durably to a line-delimited JSON dataset
//! - Reporting statistics over an existing dataset

mod jsonl;
mod memory;
pub mod stats;
mod traits;

pub use jsonl::JsonlSink;
pub use memory::MemorySink;
pub use stats::{load_dataset_stats, print_statistics, DatasetStatistics};
pub use traits::{OutputError, OutputResult, RecordSink};

use serde::{Deserialize, Serialize};

/// One harvested poem
///
/// Serialized as `{"id": .., "title": .., "author": .., "text": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoemRecord {
    /// Sequential id assigned by the harvester, never taken from the site
    pub id: u64,

    /// Title with the site's boilerplate prefix removed
    pub title: String,

    /// Author name, empty when the page has none
    pub author: String,

    /// Poem body with line breaks preserved, empty when the page has none
    pub text: String,
}
