use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;
use super::filter::extension_of;

/// One file under observation.
///
/// Created once by discovery and afterwards mutated only by the watch unit
/// that owns it.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    pub id: u64,
    pub file_name: String,
    /// Lower-cased extension, empty when the file has none
    pub file_type: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    /// Number of changes observed since discovery
    pub updates: u64,
    pub metadata: Metadata,
}

impl WatchTarget {
    /// Build a target from a freshly stat'ed file.
    pub fn new(id: u64, path: PathBuf, metadata: Metadata) -> std::io::Result<Self> {
        let modified = metadata.modified()?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file_type = extension_of(&file_name).unwrap_or_default();

        Ok(Self {
            id,
            file_name,
            file_type,
            path,
            modified,
            updates: 0,
            metadata,
        })
    }

    /// Store a newly observed metadata snapshot. Returns `true` when the
    /// modification time differs from the recorded one, in which case the
    /// change counter is incremented.
    pub fn record(&mut self, metadata: Metadata) -> std::io::Result<bool> {
        let modified = metadata.modified()?;
        if modified == self.modified {
            return Ok(false);
        }
        self.modified = modified;
        self.metadata = metadata;
        self.updates += 1;
        Ok(true)
    }

    pub fn status(&self, state: UnitState) -> TargetStatus {
        TargetStatus {
            id: self.id,
            file_name: self.file_name.clone(),
            path: self.path.clone(),
            modified: self.modified,
            updates: self.updates,
            state,
        }
    }
}

/// Lifecycle of a watch unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Polling and comparing
    Active,
    /// Timer still fires, comparisons are suppressed
    Paused,
    Terminated,
}

/// Read-only snapshot of a target, published by its unit after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetStatus {
    pub id: u64,
    pub file_name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    pub updates: u64,
    pub state: UnitState,
}
