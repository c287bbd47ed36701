//! Statistics over an existing poem dataset
//!
//! This module scans the line-delimited dataset and reports how many records
//! it holds and whether their ids form the expected contiguous sequence.

use crate::output::traits::{OutputError, OutputResult};
use crate::output::PoemRecord;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

/// Dataset statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetStatistics {
    /// Number of well-formed records
    pub total_records: u64,

    /// Lines that are not a valid record
    pub malformed_lines: u64,

    /// Id of the first record in the file
    pub first_id: Option<u64>,

    /// Id of the last record in the file
    pub last_id: Option<u64>,

    /// Ids skipped between consecutive records
    pub missing_ids: u64,

    /// Records whose id did not increase over the previous record
    pub repeated_ids: u64,

    /// Records with an empty author
    pub empty_authors: u64,

    /// Records with an empty body
    pub empty_texts: u64,
}

impl DatasetStatistics {
    /// Returns true if ids form a gap-free, strictly increasing run
    pub fn is_contiguous(&self) -> bool {
        self.missing_ids == 0 && self.repeated_ids == 0
    }

    fn observe(&mut self, record: &PoemRecord) {
        if let Some(previous) = self.last_id {
            if record.id <= previous {
                self.repeated_ids += 1;
            } else {
                self.missing_ids += record.id - previous - 1;
            }
        } else {
            self.first_id = Some(record.id);
        }

        self.last_id = Some(record.id);
        self.total_records += 1;

        if record.author.is_empty() {
            self.empty_authors += 1;
        }
        if record.text.is_empty() {
            self.empty_texts += 1;
        }
    }
}

/// Loads statistics from a dataset file
///
/// A missing dataset yields empty statistics.
///
/// # Arguments
///
/// * `path` - The dataset to scan
///
/// # Returns
///
/// * `Ok(DatasetStatistics)` - Successfully scanned dataset
/// * `Err(OutputError)` - The file exists but could not be read
pub fn load_dataset_stats(path: &Path) -> OutputResult<DatasetStatistics> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(DatasetStatistics::default()),
        Err(source) => {
            return Err(OutputError::Open {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut stats = DatasetStatistics::default();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<PoemRecord>(&line) {
            Ok(record) => stats.observe(&record),
            Err(e) => {
                tracing::debug!("Malformed record on line {}: {}", index + 1, e);
                stats.malformed_lines += 1;
            }
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Records: {}", stats.total_records);
    match (stats.first_id, stats.last_id) {
        (Some(first), Some(last)) => println!("  Id range: {} - {}", first, last),
        _ => println!("  Id range: (empty)"),
    }
    if stats.malformed_lines > 0 {
        println!("  Malformed lines: {}", stats.malformed_lines);
    }
    println!();

    println!("Id Sequence:");
    if stats.is_contiguous() {
        println!("  Contiguous");
    } else {
        println!("  Missing ids: {}", stats.missing_ids);
        println!("  Repeated ids: {}", stats.repeated_ids);
    }
    println!();

    println!("Field Coverage:");
    println!("  Empty authors: {}", stats.empty_authors);
    println!("  Empty texts: {}", stats.empty_texts);
}
