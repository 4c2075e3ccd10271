//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl lifecycle that coordinates all aspects of
//! the crawling process, including:
//! - Restoring state from a checkpoint and rebuilding the frontier
//! - Seeding the queue from the sitemap and the base URL
//! - Running the worker pool against the shared job queue
//! - Periodic progress reporting and checkpoint autosave
//! - Detecting completion and handling cancellation

use crate::config::Config;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::job::{CrawlJob, PageResult};
use crate::crawler::rate_limit::RateLimiter;
use crate::crawler::scheduler::{JobGuard, JobQueue};
use crate::crawler::sitemap::discover_sitemap_urls;
use crate::output::CrawlReport;
use crate::state::{Counter, CrawlStats, StatsSnapshot, VisitedSet};
use crate::storage::{Checkpoint, CheckpointStore};
use crate::url::{ExclusionTable, UrlGate};
use crate::{CrawlError, UrlError};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use url::Url;

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// Every reachable job was processed; the checkpoint has been cleared
    Completed,
    /// The run was cancelled; a final checkpoint has been written
    Interrupted,
}

/// Main crawler structure
///
/// Owns the shared crawl state. Cloning is cheap and every clone refers to the
/// same crawl.
pub struct Crawler<F: PageFetcher = HttpFetcher> {
    shared: Arc<Shared<F>>,
}

impl<F: PageFetcher> Clone for Crawler<F> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// State shared between the coordinator, the workers and the monitor
struct Shared<F> {
    config: Config,
    base_url: Url,
    fetcher: F,
    gate: UrlGate,
    visited: Arc<VisitedSet>,
    stats: Arc<CrawlStats>,
    results: Mutex<Vec<PageResult>>,
    queue: JobQueue,
    limiter: RateLimiter,
    checkpoints: CheckpointStore,
}

impl Crawler<HttpFetcher> {
    /// Creates a crawler that fetches over HTTP
    pub fn from_config(config: Config) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Self::new(config, fetcher)
    }
}

impl<F: PageFetcher> Crawler<F> {
    /// Creates a new crawler instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    /// * `fetcher` - The page fetch collaborator
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(CrawlError)` - The base URL or an exclusion pattern is invalid
    pub fn new(config: Config, fetcher: F) -> Result<Self, CrawlError> {
        let base_url = Url::parse(&config.crawler.base_url)
            .map_err(|e| UrlError::Parse(format!("{}: {}", config.crawler.base_url, e)))?;
        let allowed_domain = config.allowed_domain();

        let visited = Arc::new(VisitedSet::new());
        let stats = Arc::new(CrawlStats::new());
        let exclusions = ExclusionTable::new(&config.crawler.exclude_patterns)?;
        let gate = UrlGate::new(
            &allowed_domain,
            exclusions,
            Arc::clone(&visited),
            Arc::clone(&stats),
        );
        let checkpoints = CheckpointStore::for_domain(&config.checkpoint_dir(), &allowed_domain);
        let limiter = RateLimiter::per_second(config.crawler.rate_limit);

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                base_url,
                fetcher,
                gate,
                visited,
                stats,
                results: Mutex::new(Vec::new()),
                queue: JobQueue::new(),
                limiter,
                checkpoints,
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn checkpoint_store(&self) -> &CheckpointStore {
        &self.shared.checkpoints
    }

    /// Removes any checkpoint left by an earlier run
    pub fn discard_checkpoint(&self) -> Result<(), CrawlError> {
        if self.shared.checkpoints.exists() {
            tracing::info!(
                "Discarding checkpoint {}",
                self.shared.checkpoints.path().display()
            );
        }
        self.shared.checkpoints.clear()
    }

    /// Runs the crawl until the queue drains or `cancel` fires
    ///
    /// 1. Restore visited URLs, results and stats from a checkpoint, if any
    /// 2. Seed the queue: rebuilt frontier, sitemap URLs at depth 1, base URL
    ///    at depth 0
    /// 3. Run `max_workers` workers plus a progress/autosave monitor
    /// 4. Wait for the in-flight count to reach zero
    /// 5. Close the queue and join the workers
    /// 6. Clear the checkpoint, or flush a final one if cancelled
    pub async fn run(&self, cancel: CancellationToken) -> CrawlOutcome {
        let shared = &self.shared;
        tracing::info!(
            "Starting crawl of {} (domain: {}, max depth: {}, workers: {}, rate: {}/s)",
            shared.base_url,
            shared.gate.allowed_domain(),
            shared.config.crawler.max_depth,
            shared.config.crawler.max_workers,
            shared.limiter.rate()
        );

        shared.restore();
        shared.seed(&cancel).await;

        let workers: Vec<JoinHandle<()>> = (0..shared.config.crawler.max_workers)
            .map(|id| {
                let shared = Arc::clone(&self.shared);
                let cancel = cancel.clone();
                tokio::spawn(async move { shared.worker(id, cancel).await })
            })
            .collect();

        let monitor_stop = CancellationToken::new();
        let monitor = {
            let shared = Arc::clone(&self.shared);
            let stop = monitor_stop.clone();
            tokio::spawn(async move { shared.monitor(stop).await })
        };

        let outcome = tokio::select! {
            _ = shared.queue.wait_drained() => CrawlOutcome::Completed,
            _ = cancel.cancelled() => CrawlOutcome::Interrupted,
        };

        shared.queue.close();
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!("Worker task failed: {}", e);
            }
        }
        monitor_stop.cancel();
        if let Err(e) = monitor.await {
            tracing::error!("Monitor task failed: {}", e);
        }

        match outcome {
            CrawlOutcome::Completed => {
                tracing::info!(
                    "Crawl completed: {} pages crawled, {} errors",
                    shared.stats.get(Counter::PagesCrawled),
                    shared.stats.get(Counter::Errors)
                );
                if let Err(e) = shared.checkpoints.clear() {
                    tracing::warn!("Failed to remove checkpoint: {}", e);
                }
            }
            CrawlOutcome::Interrupted => {
                tracing::warn!(
                    "Crawl interrupted with {} jobs still queued",
                    shared.queue.len()
                );
                match shared.save_checkpoint() {
                    Ok(()) => tracing::info!(
                        "Progress saved to {}",
                        shared.checkpoints.path().display()
                    ),
                    Err(e) => tracing::error!("Failed to save final checkpoint: {}", e),
                }
            }
        }

        outcome
    }

    /// Point-in-time copy of the stats
    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Copy of the accumulated page results
    pub fn results(&self) -> Vec<PageResult> {
        self.shared.lock_results().clone()
    }

    /// Final stats and results for the output writers
    pub fn report(&self) -> CrawlReport {
        CrawlReport {
            stats: self.shared.stats.final_snapshot(),
            results: self.results(),
        }
    }
}

impl<F: PageFetcher> Shared<F> {
    /// Loads the checkpoint into the visited set, results and stats
    fn restore(&self) {
        let Some(checkpoint) = self.checkpoints.load() else {
            return;
        };

        tracing::info!(
            "Resuming from checkpoint saved at {}: {} visited, {} results",
            checkpoint.last_saved,
            checkpoint.visited_urls.len(),
            checkpoint.results.len()
        );
        self.visited.restore(checkpoint.visited_urls);
        self.stats.restore(&checkpoint.stats);
        self.lock_results().extend(checkpoint.results);
    }

    /// Fills the queue before the workers start
    async fn seed(&self, cancel: &CancellationToken) {
        let max_depth = self.config.crawler.max_depth;

        let rebuilt = self.rebuild_frontier();
        if rebuilt > 0 {
            tracing::info!("Re-queued {} URLs from checkpointed pages", rebuilt);
        }

        if self.config.crawler.use_sitemap && max_depth >= 1 {
            let discovery = discover_sitemap_urls(
                &self.fetcher,
                &self.base_url,
                self.config.crawler.max_sitemap_urls,
            );
            let sitemap_urls = tokio::select! {
                urls = discovery => urls,
                _ = cancel.cancelled() => Vec::new(),
            };

            let admitted = sitemap_urls
                .iter()
                .filter(|url| self.enqueue(url, 1))
                .count();
            if admitted > 0 {
                tracing::info!("Added {} URLs from sitemap", admitted);
            }
        }

        let base_url = self.base_url.as_str();
        if !self.visited.contains(base_url) && !self.enqueue(base_url, 0) {
            tracing::debug!("Base URL {} not admitted", base_url);
        }
    }

    /// Requeues unvisited links of restored pages that may still have children
    fn rebuild_frontier(&self) -> usize {
        let max_depth = self.config.crawler.max_depth;
        let mut jobs = Vec::new();
        {
            let results = self.lock_results();
            for result in results.iter() {
                if result.depth >= max_depth || result.is_error() {
                    continue;
                }
                for link in &result.links {
                    if self.gate.readmit(link) {
                        jobs.push(CrawlJob::new(link.clone(), result.depth + 1));
                    }
                }
            }
        }

        let count = jobs.len();
        for job in jobs {
            self.queue.push(job);
        }
        count
    }

    /// Runs `url` through the gate and queues it if admitted
    fn enqueue(&self, url: &str, depth: u32) -> bool {
        if self.gate.admit(url).is_admitted() {
            self.queue.push(CrawlJob::new(url, depth));
            true
        } else {
            false
        }
    }

    /// Worker loop: one job at a time until the queue closes or `cancel` fires
    async fn worker(&self, id: u32, cancel: CancellationToken) {
        tracing::debug!("Worker {} started", id);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                job = self.queue.pop() => job,
            };
            let Some(guard) = next else {
                break;
            };

            self.process(guard, &cancel).await;
        }

        tracing::debug!("Worker {} stopped", id);
    }

    /// Fetches one job and queues its children
    ///
    /// `guard` is held until every child has been pushed.
    async fn process(&self, guard: JobGuard<'_>, cancel: &CancellationToken) {
        let job = guard.job();

        if self.visited.contains(&job.url) {
            tracing::trace!("Skipping visited URL {}", job.url);
            return;
        }

        if !self.limiter.acquire(cancel).await {
            return;
        }

        if !self.visited.mark_visited(&job.url) {
            return;
        }

        tracing::debug!("Crawling {} (depth {})", job.url, job.depth);
        let result = self.fetcher.fetch_page(&job.url, job.depth).await;

        if job.depth < self.config.crawler.max_depth {
            for link in &result.links {
                self.enqueue(link, job.depth + 1);
            }
        }

        // Page counters move together with the result list, so a checkpoint
        // never counts a page it has no result for
        let mut results = self.lock_results();
        match &result.error {
            Some(error) => {
                tracing::warn!("Error crawling {}: {}", job.url, error);
                self.stats.record(Counter::Errors);
            }
            None => self.stats.record(Counter::PagesCrawled),
        }
        self.stats.add(Counter::PagesFound, result.links.len() as u64);
        results.push(result);
    }

    /// Periodic progress log and checkpoint autosave
    async fn monitor(&self, stop: CancellationToken) {
        let mut progress = tokio::time::interval(self.config.progress_interval());
        let mut autosave = tokio::time::interval(self.config.checkpoint_interval());
        progress.set_missed_tick_behavior(MissedTickBehavior::Delay);
        autosave.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Both intervals fire immediately on the first tick
        progress.tick().await;
        autosave.tick().await;

        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = progress.tick() => self.log_progress(),
                _ = autosave.tick() => {
                    if let Err(e) = self.save_checkpoint() {
                        tracing::warn!("Autosave failed: {}", e);
                    }
                }
            }
        }
    }

    fn log_progress(&self) {
        let stats = self.stats.snapshot();
        tracing::info!(
            "Progress: {} crawled, {} found, {} errors (in flight: {})",
            stats.pages_crawled,
            stats.pages_found,
            stats.errors,
            self.queue.in_flight()
        );
    }

    /// Persists every page with a recorded result
    ///
    /// Pages still being fetched are left out of `visited_urls`, so a resume
    /// fetches them again instead of dropping them.
    fn save_checkpoint(&self) -> Result<(), CrawlError> {
        let checkpoint = {
            let results = self.lock_results();
            let visited = results.iter().map(|r| r.url.clone()).collect();
            Checkpoint::new(visited, results.clone(), self.stats.snapshot())
        };
        self.checkpoints.save(&checkpoint)
    }

    fn lock_results(&self) -> MutexGuard<'_, Vec<PageResult>> {
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
