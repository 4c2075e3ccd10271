//! Crawl progress counters
//!
//! All counters are monotonic. Workers bump them concurrently through
//! [`CrawlStats::record`]; progress reporting and checkpointing read a
//! point-in-time [`StatsSnapshot`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Identifies one of the crawl counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    PagesFound,
    PagesCrawled,
    ExternalLinks,
    ExcludedLinks,
    Errors,
}

/// Thread-safe crawl statistics
#[derive(Debug)]
pub struct CrawlStats {
    pages_found: AtomicU64,
    pages_crawled: AtomicU64,
    external_links: AtomicU64,
    excluded_links: AtomicU64,
    errors: AtomicU64,
    start_time: RwLock<DateTime<Utc>>,
}

/// Serializable view of [`CrawlStats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub pages_found: u64,
    pub pages_crawled: u64,
    pub external_links: u64,
    pub excluded_links: u64,
    pub errors: u64,
    pub start_time: DateTime<Utc>,

    /// Set on the final report only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            pages_found: AtomicU64::new(0),
            pages_crawled: AtomicU64::new(0),
            external_links: AtomicU64::new(0),
            excluded_links: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            start_time: RwLock::new(Utc::now()),
        }
    }

    fn counter(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::PagesFound => &self.pages_found,
            Counter::PagesCrawled => &self.pages_crawled,
            Counter::ExternalLinks => &self.external_links,
            Counter::ExcludedLinks => &self.excluded_links,
            Counter::Errors => &self.errors,
        }
    }

    /// Increments a counter by one
    pub fn record(&self, counter: Counter) {
        self.add(counter, 1);
    }

    /// Increments a counter by `n`
    pub fn add(&self, counter: Counter, n: u64) {
        self.counter(counter).fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.counter(counter).load(Ordering::Relaxed)
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        *self
            .start_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Restores counters and the start time from a checkpoint
    ///
    /// Counters are raised to the restored values with `fetch_max`, so a
    /// restore can never move a counter backwards.
    pub fn restore(&self, snapshot: &StatsSnapshot) {
        self.pages_found
            .fetch_max(snapshot.pages_found, Ordering::Relaxed);
        self.pages_crawled
            .fetch_max(snapshot.pages_crawled, Ordering::Relaxed);
        self.external_links
            .fetch_max(snapshot.external_links, Ordering::Relaxed);
        self.excluded_links
            .fetch_max(snapshot.excluded_links, Ordering::Relaxed);
        self.errors.fetch_max(snapshot.errors, Ordering::Relaxed);

        let mut start = self
            .start_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *start = snapshot.start_time;
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_found: self.get(Counter::PagesFound),
            pages_crawled: self.get(Counter::PagesCrawled),
            external_links: self.get(Counter::ExternalLinks),
            excluded_links: self.get(Counter::ExcludedLinks),
            errors: self.get(Counter::Errors),
            start_time: self.start_time(),
            finished_at: None,
            duration_secs: None,
        }
    }

    /// Snapshot stamped with the finish time and total duration
    pub fn final_snapshot(&self) -> StatsSnapshot {
        let mut snapshot = self.snapshot();
        let now = Utc::now();
        let elapsed = (now - snapshot.start_time).num_milliseconds().max(0) as f64 / 1000.0;
        snapshot.finished_at = Some(now);
        snapshot.duration_secs = Some(elapsed);
        snapshot
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSnapshot {
    /// Pages that produced a result, successful or not
    pub fn pages_processed(&self) -> u64 {
        self.pages_crawled + self.errors
    }

    /// Average crawl speed in pages per second, if a duration is known
    pub fn pages_per_second(&self) -> Option<f64> {
        match self.duration_secs {
            Some(secs) if secs > 0.0 => Some(self.pages_crawled as f64 / secs),
            _ => None,
        }
    }
}
