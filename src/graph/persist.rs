//! Snapshot persistence
//!
//! The crawler only needs two things from storage: read the whole graph at
//! start, and write the whole graph after each chunk.

use crate::graph::{GraphError, GraphSnapshot};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Trait for snapshot storage backends
pub trait SnapshotStore: Send + Sync {
    /// Reads and parses the persisted snapshot
    fn load(&self) -> Result<GraphSnapshot, GraphError>;

    /// Replaces the persisted snapshot with `snapshot`
    fn save(&self, snapshot: &GraphSnapshot) -> Result<(), GraphError>;

    /// Where the snapshot lives, for error reporting
    fn path(&self) -> &Path;
}

/// Snapshot stored as one JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling file the next snapshot is staged in before the rename
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<GraphSnapshot, GraphError> {
        let bytes = fs::read(&self.path)?;
        GraphSnapshot::from_json(&bytes)
    }

    fn save(&self, snapshot: &GraphSnapshot) -> Result<(), GraphError> {
        let bytes = snapshot.to_json()?;
        let staging = self.staging_path();

        {
            let mut file = fs::File::create(&staging)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }

        // rename is atomic on the same filesystem: readers see old or new, never half
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
