//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawls
//! end-to-end against them.

mod common;
mod crawl_tests;
mod resume_tests;
