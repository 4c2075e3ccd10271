//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The job queue and its in-flight accounting
//! - The global rate limiter
//! - HTTP fetching, HTML parsing and sitemap discovery
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod job;
mod parser;
mod rate_limit;
mod scheduler;
mod sitemap;

pub use coordinator::{CrawlOutcome, Crawler};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use job::{CrawlJob, PageResult};
pub use parser::{parse_html, ParsedPage};
pub use rate_limit::RateLimiter;
pub use scheduler::{JobGuard, JobQueue};
pub use sitemap::{discover_sitemap_urls, parse_sitemap, sitemap_candidates, SitemapDocument};
