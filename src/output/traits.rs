//! Record sink traits and error types
//!
//! This module defines the trait interface for record sinks and associated
//! error types.

use crate::output::PoemRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write record {id}: {source}")]
    Write { id: u64, source: std::io::Error },

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for record sinks
///
/// A sink receives every harvested poem in id order. When `emit` returns
/// `Ok`, the record must survive a crash of the process.
pub trait RecordSink: Send {
    /// Appends one record
    fn emit(&mut self, record: &PoemRecord) -> OutputResult<()>;

    /// Number of records emitted through this sink
    fn records_written(&self) -> u64;
}
