//! Line-delimited JSON dataset sink

use crate::output::traits::{OutputError, OutputResult, RecordSink};
use crate::output::PoemRecord;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends each record as one JSON object per line
///
/// The file is opened in append mode, so earlier runs' records are kept.
/// Every line is synced to disk before `emit` returns.
pub struct JsonlSink {
    path: PathBuf,
    file: File,
    written: u64,
}

impl JsonlSink {
    /// Opens (creating if needed) the dataset at `path` for appending
    pub fn open(path: &Path) -> OutputResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| OutputError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            written: 0,
        })
    }

    /// Path of the dataset file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonlSink {
    fn emit(&mut self, record: &PoemRecord) -> OutputResult<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        // One write per line keeps each record a single append
        self.file
            .write_all(&line)
            .and_then(|_| self.file.sync_data())
            .map_err(|source| OutputError::Write {
                id: record.id,
                source,
            })?;

        self.written += 1;
        tracing::debug!("Wrote poem {} to {}", record.id, self.path.display());
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.written
    }
}
