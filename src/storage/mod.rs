//! Storage module for persisting harvest progress
//!
//! This module handles the resumability checkpoint:
//! - The `Checkpoint` cursor (last completed listing page, next poem id)
//! - The `CheckpointStore` trait
//! - A JSON file backend with atomic replacement

mod json_store;
mod traits;

pub use json_store::JsonCheckpointStore;
pub use traits::{CheckpointError, CheckpointResult, CheckpointStore};

use serde::{Deserialize, Serialize};

/// Durable harvest cursor
///
/// Serialized as `{"last_page": N, "next_poem_id": M}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Last listing page whose links were all processed (0 = none yet)
    #[serde(rename = "last_page", default)]
    pub last_page_completed: u32,

    /// Id assigned to the next poem produced
    #[serde(rename = "next_poem_id", default = "default_next_id")]
    pub next_id: u64,
}

impl Checkpoint {
    /// Creates a checkpoint for a completed page
    pub fn new(last_page_completed: u32, next_id: u64) -> Self {
        Self {
            last_page_completed,
            next_id,
        }
    }

    /// The listing page a resumed harvest starts from
    pub fn resume_page(&self) -> u32 {
        self.last_page_completed.saturating_add(1)
    }

    /// Returns true if no page has been completed yet
    pub fn is_fresh(&self) -> bool {
        self.last_page_completed == 0 && self.next_id == default_next_id()
    }
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self {
            last_page_completed: 0,
            next_id: default_next_id(),
        }
    }
}

fn default_next_id() -> u64 {
    1
}
