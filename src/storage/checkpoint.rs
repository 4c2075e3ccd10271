//! Checkpoint persistence
//!
//! A checkpoint is a single JSON document per allowed domain holding the
//! visited set, the accumulated results and the stats. Every save replaces the
//! whole file. Its presence on disk means a previous run did not finish.

use crate::config::safe_domain_name;
use crate::crawler::PageResult;
use crate::state::StatsSnapshot;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Snapshot of crawl state sufficient to resume a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub visited_urls: Vec<String>,
    pub results: Vec<PageResult>,
    pub stats: StatsSnapshot,
    pub last_saved: DateTime<Utc>,
}

impl Checkpoint {
    /// Builds a checkpoint stamped with the current time
    pub fn new(visited_urls: Vec<String>, results: Vec<PageResult>, stats: StatsSnapshot) -> Self {
        Self {
            visited_urls,
            results,
            stats,
            last_saved: Utc::now(),
        }
    }
}

/// File-backed checkpoint store keyed by domain
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Creates a store for `domain` inside `dir`
    ///
    /// The file name is derived from the domain alone, so crawls of different
    /// domains never share a checkpoint:
    /// `example.com` → `<dir>/crawler_example_com_checkpoint.json`.
    pub fn for_domain(dir: &Path, domain: &str) -> Self {
        let file_name = format!("crawler_{}_checkpoint.json", safe_domain_name(domain));
        Self {
            path: dir.join(file_name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes `checkpoint`, replacing any previous file
    ///
    /// The document is written to a temporary sibling and renamed into place,
    /// so a crash mid-write leaves the previous checkpoint intact.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), CrawlError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let encoded = serde_json::to_vec(checkpoint)?;
        let tmp_path = self.path.with_extension("json.tmp");

        fs::write(&tmp_path, encoded).map_err(|e| {
            CrawlError::Checkpoint(format!(
                "Failed to write temporary checkpoint {}: {}",
                tmp_path.display(),
                e
            ))
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            CrawlError::Checkpoint(format!(
                "Failed to move checkpoint into place at {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            "Checkpoint saved to {} ({} visited, {} results)",
            self.path.display(),
            checkpoint.visited_urls.len(),
            checkpoint.results.len()
        );
        Ok(())
    }

    /// Reads the checkpoint, if one exists and parses
    ///
    /// A missing file is the normal fresh-start case. An unreadable or corrupt
    /// file is logged and also treated as "no prior state".
    pub fn load(&self) -> Option<Checkpoint> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No checkpoint at {}", self.path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read checkpoint {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<Checkpoint>(&data) {
            Ok(checkpoint) => {
                tracing::info!(
                    "Checkpoint loaded: {} visited, {} results",
                    checkpoint.visited_urls.len(),
                    checkpoint.results.len()
                );
                Some(checkpoint)
            }
            Err(e) => {
                tracing::warn!("Failed to parse checkpoint {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Removes the checkpoint after a completed run
    pub fn clear(&self) -> Result<(), CrawlError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Checkpoint {} removed", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
