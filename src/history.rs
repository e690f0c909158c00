use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::VideoRecord;
use crate::error::Result;

/// At most this many entries are retained, newest first
pub const MAX_ENTRIES: usize = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Completed,
    Failed,
    Processing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub video: VideoRecord,
    pub timestamp: i64,
    pub status: EntryStatus,
}

/// Durable download history, persisted as one JSON file.
///
/// Single logical writer; the whole list is rewritten on every mutation.
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Load history from `path`. A missing file means an empty history;
    /// a malformed file is discarded with a warning.
    pub fn load(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Discarding malformed history file {}: {e}", path.display());
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Record a completed download.
    ///
    /// A newer save of the same video id replaces the older entry's position:
    /// the record moves to the front without duplicating. The list is capped
    /// at [`MAX_ENTRIES`].
    pub fn record(&mut self, video: VideoRecord) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        self.entries.retain(|e| e.video.id != video.id);
        self.entries.insert(
            0,
            HistoryEntry {
                id: now.to_string(),
                video,
                timestamp: now,
                status: EntryStatus::Completed,
            },
        );
        self.entries.truncate(MAX_ENTRIES);
        self.persist()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}
