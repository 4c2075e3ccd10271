use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Ripple-Crawl
///
/// Immutable for the lifetime of a crawl run. Loaded from TOML and/or
/// assembled from command-line flags, then validated once before any
/// crawl work begins.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URL the crawl starts from (depth 0)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Only URLs whose host equals this domain are crawled.
    /// Defaults to the host of `base_url`.
    #[serde(rename = "allowed-domain", default)]
    pub allowed_domain: Option<String>,

    /// Maximum depth to crawl from the seed URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of concurrent workers
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: u32,

    /// Global limit on fetch starts per second
    #[serde(rename = "rate-limit", default = "default_rate_limit")]
    pub rate_limit: u32,

    /// Seed the queue from the domain's sitemap
    #[serde(rename = "use-sitemap", default = "default_true")]
    pub use_sitemap: bool,

    /// Upper bound on URLs taken from sitemap discovery
    #[serde(rename = "max-sitemap-urls", default = "default_max_sitemap_urls")]
    pub max_sitemap_urls: usize,

    /// Additional exclusion regexes, evaluated alongside the built-in table
    #[serde(rename = "exclude-patterns", default)]
    pub exclude_patterns: Vec<String>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Output and persistence configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving results.json and summary.md
    #[serde(rename = "output-dir", default)]
    pub output_dir: Option<PathBuf>,

    /// Directory holding the per-domain checkpoint file
    #[serde(rename = "checkpoint-dir", default)]
    pub checkpoint_dir: Option<PathBuf>,

    /// Autosave interval (seconds)
    #[serde(rename = "checkpoint-interval-secs", default)]
    pub checkpoint_interval_secs: Option<u64>,

    /// Progress report interval (seconds)
    #[serde(rename = "progress-interval-secs", default)]
    pub progress_interval_secs: Option<u64>,
}

impl Config {
    /// Builds a configuration for `base_url` with every other setting at its default
    pub fn for_url(base_url: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig {
                base_url: base_url.into(),
                allowed_domain: None,
                max_depth: default_max_depth(),
                max_workers: default_max_workers(),
                rate_limit: default_rate_limit(),
                use_sitemap: true,
                max_sitemap_urls: default_max_sitemap_urls(),
                exclude_patterns: Vec::new(),
            },
            http: HttpConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// The domain links must match to be crawled
    ///
    /// Falls back to the host of the base URL when no domain was configured.
    /// The result is a lowercase host without a port, the same form the gate
    /// extracts from links. Returns an empty string only for a base URL
    /// without a host, which validation rejects.
    pub fn allowed_domain(&self) -> String {
        match &self.crawler.allowed_domain {
            Some(domain) => normalize_domain(domain),
            None => ::url::Url::parse(&self.crawler.base_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_lowercase))
                .unwrap_or_default(),
        }
    }

    /// Directory where final results are written
    pub fn output_dir(&self) -> PathBuf {
        self.output.output_dir.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "crawler_results_{}",
                safe_domain_name(&self.allowed_domain())
            ))
        })
    }

    /// Directory where the checkpoint file lives
    pub fn checkpoint_dir(&self) -> PathBuf {
        self.output
            .checkpoint_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }

    pub fn checkpoint_interval(&self) -> Duration {
        Duration::from_secs(self.output.checkpoint_interval_secs.unwrap_or(30))
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.output.progress_interval_secs.unwrap_or(5))
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Lowercases a configured domain and drops any `:port` suffix
fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim();
    ::url::Url::parse(&format!("http://{}/", trimmed))
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| trimmed.to_lowercase())
}

/// Turns a domain into a filesystem-friendly name (`example.com` → `example_com`)
pub fn safe_domain_name(domain: &str) -> String {
    domain.replace(['.', ':'], "_")
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_workers() -> u32 {
    20
}

fn default_rate_limit() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

fn default_max_sitemap_urls() -> usize {
    1000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; WebCrawler/1.0)".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
