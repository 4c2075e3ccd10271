//! Configuration module for Ripple-Crawl
//!
//! This module handles loading, parsing, and validating crawl configuration,
//! either from a TOML file or assembled from command-line flags.
//!
//! # Example
//!
//! ```no_run
//! use ripple_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{safe_domain_name, Config, CrawlerConfig, HttpConfig, OutputConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, read_config,
    read_config_with_hash,
};
pub use validation::validate;
