//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests for pages, turned into [`PageResult`]s
//! - Raw document fetches for sitemap discovery
//! - Error classification
//!
//! A failed fetch never produces an `Err`; the failure is described on the
//! returned page result.

use crate::config::HttpConfig;
use crate::crawler::job::PageResult;
use crate::crawler::parser::parse_html;
use crate::CrawlError;
use reqwest::{header, Client, StatusCode};
use std::future::Future;
use std::time::Duration;

/// Fetches and parses pages on behalf of the workers
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetches `url` and returns its result at `depth`
    ///
    /// Transport failures and non-200 responses are reported through
    /// [`PageResult::error`].
    fn fetch_page(&self, url: &str, depth: u32) -> impl Future<Output = PageResult> + Send;

    /// Fetches the raw body of a non-page document such as a sitemap
    ///
    /// Returns `None` for anything other than a successful response.
    fn fetch_document(&self, url: &str) -> impl Future<Output = Option<String>> + Send;
}

/// [`PageFetcher`] backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed with reqwest's default policy; the connection pool is
/// shared by every worker.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, CrawlError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str, depth: u32) -> PageResult {
        let mut result = PageResult::new(url, depth);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Fetch failed for {}: {}", url, e);
                result.error = Some(describe_error(&e));
                return result;
            }
        };

        let status = response.status();
        result.status_code = status.as_u16();
        result.content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if status != StatusCode::OK {
            result.error = Some(format!("HTTP {}", status.as_u16()));
            return result;
        }

        // Only HTML is parsed; other content types are recorded as crawled
        if !result.content_type.contains("text/html") {
            return result;
        }

        let final_url = response.url().clone();
        match response.text().await {
            Ok(body) => {
                let parsed = parse_html(&body, &final_url);
                result.title = parsed.title.unwrap_or_default();
                result.links = parsed.links;
            }
            Err(e) => {
                tracing::debug!("Failed to read body of {}: {}", url, e);
                result.error = Some(describe_error(&e));
            }
        }

        result
    }

    async fn fetch_document(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Failed to fetch {}: {}", url, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::debug!("{} returned HTTP {}", url, response.status().as_u16());
            return None;
        }

        response.text().await.ok()
    }
}

/// Turns a reqwest error into the message stored on a page result
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}
