//! Output module for generating crawl summaries and reports
//!
//! This module handles:
//! - Writing the final `results.json` document
//! - Generating a markdown summary next to it
//! - Printing crawl statistics to the console

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::print_statistics;

use crate::crawler::PageResult;
use crate::state::StatsSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the results document inside the output directory
pub const RESULTS_FILE: &str = "results.json";

/// File name of the markdown summary inside the output directory
pub const SUMMARY_FILE: &str = "summary.md";

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// The final results document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub stats: StatsSnapshot,
    pub results: Vec<PageResult>,
}

impl CrawlReport {
    /// Number of results at each depth
    pub fn depth_breakdown(&self) -> BTreeMap<u32, usize> {
        let mut depths = BTreeMap::new();
        for result in &self.results {
            *depths.entry(result.depth).or_insert(0) += 1;
        }
        depths
    }

    /// Results that carry an error
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageResult> {
        self.results.iter().filter(|r| r.is_error())
    }
}

/// Writes `report` as pretty-printed JSON to `<dir>/results.json`
///
/// The directory is created if it does not exist.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError)` - The directory or file could not be written
pub fn write_results(dir: &Path, report: &CrawlReport) -> OutputResult<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(RESULTS_FILE);
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json)?;

    tracing::info!("Results saved to {}", path.display());
    Ok(path)
}
