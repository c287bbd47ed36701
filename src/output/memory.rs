//! In-memory record sink

use crate::output::traits::{OutputResult, RecordSink};
use crate::output::PoemRecord;

/// Collects emitted records in a `Vec`
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<PoemRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records emitted so far, in emission order
    pub fn records(&self) -> &[PoemRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PoemRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn emit(&mut self, record: &PoemRecord) -> OutputResult<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn records_written(&self) -> u64 {
        self.records.len() as u64
    }
}
