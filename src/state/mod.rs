//! Shared crawl state
//!
//! Structures in this module are mutated by many workers at once and are safe
//! to use through a shared reference without any external locking.

mod stats;
mod visited;

pub use stats::{Counter, CrawlStats, StatsSnapshot};
pub use visited::VisitedSet;
