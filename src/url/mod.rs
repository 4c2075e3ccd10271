//! URL handling module for Ripple-Crawl
//!
//! This module provides domain extraction, the exclusion-pattern table, and
//! the URL Gate that decides whether a discovered link becomes a crawl job.

mod domain;
mod exclude;
mod gate;

// Re-export main types and functions
pub use domain::{domain_of, extract_domain};
pub use exclude::{ExclusionRule, ExclusionTable};
pub use gate::{UrlGate, Verdict};
