//! Crawl job and page result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single URL to fetch at a given depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub url: String,
    pub depth: u32,
}

impl CrawlJob {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Outcome of fetching one page
///
/// Per-page failures are recorded in `error` rather than surfaced as `Err`,
/// so a result exists for every URL a worker picked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub status_code: u16,
    pub depth: u32,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub crawled_at: DateTime<Utc>,
    #[serde(default)]
    pub content_type: String,
}

impl PageResult {
    /// Creates an empty result for `url`, stamped now
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            status_code: 0,
            depth,
            links: Vec::new(),
            error: None,
            crawled_at: Utc::now(),
            content_type: String::new(),
        }
    }

    /// Creates a result describing a failed fetch
    pub fn failed(url: impl Into<String>, depth: u32, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(url, depth)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
