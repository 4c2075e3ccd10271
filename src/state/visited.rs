//! Concurrent visited-URL tracking
//!
//! Two sets are kept. A URL is *claimed* the moment it is admitted into the
//! work queue, and *visited* once a worker starts fetching it. Claiming makes
//! sure a URL discovered by several parents at once is enqueued only once.
//! A checkpoint restores the visited set from the pages it has results for.
//!
//! Every visited URL is also claimed. Neither set ever shrinks.

use dashmap::DashSet;

/// Concurrent membership sets for URL admission
#[derive(Debug, Default)]
pub struct VisitedSet {
    claimed: DashSet<String>,
    visited: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `url` for the work queue
    ///
    /// Returns `true` only for the first caller; every later call for the
    /// same URL returns `false`.
    pub fn claim(&self, url: &str) -> bool {
        if self.claimed.contains(url) {
            return false;
        }
        self.claimed.insert(url.to_string())
    }

    /// Returns true if `url` has been claimed or visited
    pub fn is_known(&self, url: &str) -> bool {
        self.claimed.contains(url)
    }

    /// Atomically marks `url` as visited
    ///
    /// Returns `true` if this call was the one that marked it.
    pub fn mark_visited(&self, url: &str) -> bool {
        self.claimed.insert(url.to_string());
        self.visited.insert(url.to_string())
    }

    /// Returns true if a fetch of `url` has been started
    pub fn contains(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of visited URLs
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Marks every URL in `urls` as visited
    pub fn restore<I>(&self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        for url in urls {
            self.mark_visited(&url);
        }
    }
}
