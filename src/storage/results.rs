//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::fs::Metadata;
use std::time::{SystemTime, UNIX_EPOCH};

/// Result of a stat operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    /// Last segment of the virtual path, `/` for the root
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
}

impl FileStat {
    pub fn from_metadata(name: impl Into<String>, metadata: &Metadata) -> Self {
        Self {
            name: name.into(),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified: metadata.modified().unwrap_or(UNIX_EPOCH),
            is_dir: metadata.is_dir(),
        }
    }

    /// Modification time as seconds since the Unix epoch
    pub fn modified_secs(&self) -> u64 {
        self.modified
            .duration_since(UNIX_EPOCH)
            .map(|dur| dur.as_secs())
            .unwrap_or(0)
    }
}
