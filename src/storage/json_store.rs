//! JSON file checkpoint backend

use crate::storage::traits::{CheckpointError, CheckpointResult, CheckpointStore};
use crate::storage::Checkpoint;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Checkpoint stored as a single JSON object in a file
///
/// Saves go to a sibling `.tmp` file which is synced and then renamed over
/// the checkpoint, so an interrupted save leaves the previous checkpoint in
/// place.
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    /// Creates a store backed by the file at `path`
    ///
    /// The file does not need to exist yet.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Path of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "checkpoint".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Syncs the directory holding the checkpoint so the rename survives a
    /// power loss
    fn sync_parent_dir(&self) -> CheckpointResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        File::open(dir)
            .and_then(|d| d.sync_all())
            .map_err(|e| self.write_error(e))
    }

    fn write_error(&self, source: std::io::Error) -> CheckpointError {
        CheckpointError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> Checkpoint {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(
                    "No checkpoint at {}, starting from page 1",
                    self.path.display()
                );
                return Checkpoint::default();
            }
            Err(e) => {
                tracing::warn!(
                    "Error reading checkpoint {}: {}; starting from page 1",
                    self.path.display(),
                    e
                );
                return Checkpoint::default();
            }
        };

        match serde_json::from_str::<Checkpoint>(&content) {
            Ok(checkpoint) if checkpoint.next_id == 0 => {
                tracing::warn!(
                    "Checkpoint {} has next_poem_id 0; starting from page 1",
                    self.path.display()
                );
                Checkpoint::default()
            }
            Ok(checkpoint) => {
                tracing::info!(
                    "Resuming from page {} with next poem ID {}",
                    checkpoint.resume_page(),
                    checkpoint.next_id
                );
                checkpoint
            }
            Err(e) => {
                tracing::warn!(
                    "Error loading checkpoint {}: {}; starting from page 1",
                    self.path.display(),
                    e
                );
                Checkpoint::default()
            }
        }
    }

    fn save(&mut self, checkpoint: &Checkpoint) -> CheckpointResult<()> {
        let json = serde_json::to_vec(checkpoint)?;
        let temp_path = self.temp_path();

        let mut file = File::create(&temp_path).map_err(|e| self.write_error(e))?;
        file.write_all(&json).map_err(|e| self.write_error(e))?;
        file.sync_all().map_err(|e| self.write_error(e))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| self.write_error(e))?;
        self.sync_parent_dir()?;

        tracing::info!(
            "Checkpoint saved: last page = {}, next poem ID = {}",
            checkpoint.last_page_completed,
            checkpoint.next_id
        );
        Ok(())
    }

    fn clear(&mut self) -> CheckpointResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Removed checkpoint {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CheckpointError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
