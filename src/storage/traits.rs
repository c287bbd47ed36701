//! Checkpoint store trait and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::storage::Checkpoint;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting a checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to write checkpoint {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove checkpoint {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Trait for checkpoint backends
///
/// The checkpoint is the single source of truth for resumability: it is read
/// once when a harvest starts and rewritten after every fully processed
/// listing page.
pub trait CheckpointStore: Send {
    /// Loads the saved checkpoint
    ///
    /// Never fails: a missing or unreadable checkpoint yields
    /// `Checkpoint::default()` and the condition is logged.
    fn load(&self) -> Checkpoint;

    /// Durably replaces the saved checkpoint
    ///
    /// An error here is fatal to the harvest, since progress past this point
    /// could not be resumed.
    fn save(&mut self, checkpoint: &Checkpoint) -> CheckpointResult<()>;

    /// Discards the saved checkpoint so the next load starts over
    fn clear(&mut self) -> CheckpointResult<()>;
}
