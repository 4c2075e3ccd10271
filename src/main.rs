//! Ripple-Crawl main entry point
//!
//! This is the command-line interface for the Ripple-Crawl site crawler.

use anyhow::{bail, Context};
use clap::Parser;
use ripple_crawl::config::{read_config_with_hash, validate, Config};
use ripple_crawl::crawler::{CrawlOutcome, Crawler};
use ripple_crawl::output::{
    generate_markdown_summary, print_statistics, write_results, SUMMARY_FILE,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Ripple-Crawl: a resumable single-domain web crawler
///
/// Crawls one domain breadth-first up to a depth limit with a fixed pool of
/// workers behind a global rate limit. Progress is checkpointed, so an
/// interrupted crawl resumes where it stopped.
#[derive(Parser, Debug)]
#[command(name = "ripple-crawl")]
#[command(version = "1.0.0")]
#[command(about = "A resumable single-domain web crawler", long_about = None)]
struct Cli {
    /// Base URL to start crawling from
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Allowed domain (defaults to the host of the base URL)
    #[arg(short, long, value_name = "DOMAIN")]
    domain: Option<String>,

    /// Maximum crawl depth
    #[arg(long, value_name = "N")]
    depth: Option<u32>,

    /// Number of concurrent workers
    #[arg(short, long, value_name = "N")]
    workers: Option<u32>,

    /// Requests per second
    #[arg(short, long, value_name = "N")]
    rate: Option<u32>,

    /// Output directory for results.json and summary.md
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Skip sitemap discovery
    #[arg(long)]
    no_sitemap: bool,

    /// Directory for the checkpoint file
    #[arg(long, value_name = "DIR")]
    checkpoint_dir: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Start a fresh crawl, discarding any checkpoint
    #[arg(long)]
    fresh: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    validate(&config).context("Invalid configuration")?;

    handle_crawl(config, cli.fresh, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_crawl=info,warn"),
            1 => EnvFilter::new("ripple_crawl=debug,info"),
            2 => EnvFilter::new("ripple_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match (&cli.config, &cli.url) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        (None, Some(url)) => Config::for_url(url.clone()),
        (None, None) => bail!("A base URL is required: pass --url or --config"),
    };

    if let Some(url) = &cli.url {
        config.crawler.base_url = url.clone();
    }
    if let Some(domain) = &cli.domain {
        config.crawler.allowed_domain = Some(domain.clone());
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(workers) = cli.workers {
        config.crawler.max_workers = workers;
    }
    if let Some(rate) = cli.rate {
        config.crawler.rate_limit = rate;
    }
    if cli.no_sitemap {
        config.crawler.use_sitemap = false;
    }
    if let Some(output) = &cli.output {
        config.output.output_dir = Some(output.clone());
    }
    if let Some(dir) = &cli.checkpoint_dir {
        config.output.checkpoint_dir = Some(dir.clone());
    }

    Ok(config)
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool, quiet: bool) -> anyhow::Result<()> {
    let output_dir = config.output_dir();
    let base_url = config.crawler.base_url.clone();

    let crawler = Crawler::from_config(config).context("Failed to initialize crawler")?;

    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous state)");
        crawler
            .discard_checkpoint()
            .context("Failed to remove existing checkpoint")?;
    } else if crawler.checkpoint_store().exists() {
        tracing::info!(
            "Found checkpoint {}, resuming",
            crawler.checkpoint_store().path().display()
        );
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping workers");
                cancel.cancel();
            }
        });
    }

    match crawler.run(cancel).await {
        CrawlOutcome::Completed => {}
        CrawlOutcome::Interrupted => bail!(
            "Crawl interrupted; progress saved to {}",
            crawler.checkpoint_store().path().display()
        ),
    }

    let report = crawler.report();
    write_results(&output_dir, &report).context("Failed to write results")?;
    let summary_path = output_dir.join(SUMMARY_FILE);
    generate_markdown_summary(&report, &base_url, &summary_path)
        .context("Failed to write summary")?;
    tracing::info!("Summary saved to {}", summary_path.display());

    if !quiet {
        print_statistics(&report);
    }

    Ok(())
}
