//! Work queue with in-flight accounting
//!
//! This module handles:
//! - The shared FIFO queue of crawl jobs drained by the worker pool
//! - Counting every job from creation until it is fully resolved
//! - Waking the coordinator exactly when that count reaches zero
//!
//! A job stays in flight while a worker holds its [`JobGuard`]. Workers push a
//! job's children before the guard is dropped, so the count can only reach
//! zero once no job exists that could still produce more work.

use crate::crawler::job::CrawlJob;
use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Shared job queue for the worker pool
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<CrawlJob>>,
    available: Notify,
    in_flight: AtomicUsize,
    drained: Notify,
    closed: AtomicBool,
}

/// A dequeued job that is still counted as in flight
///
/// Dropping the guard resolves the job.
#[derive(Debug)]
pub struct JobGuard<'a> {
    queue: &'a JobQueue,
    job: CrawlJob,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a job to the back of the queue
    ///
    /// The in-flight count is incremented before the job becomes visible to
    /// any worker.
    pub fn push(&self, job: CrawlJob) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.lock_jobs().push_back(job);
        self.available.notify_one();
    }

    /// Takes the next job, waiting while the queue is empty
    ///
    /// Returns `None` once the queue has been closed and is empty.
    pub async fn pop(&self) -> Option<JobGuard<'_>> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let next = self.lock_jobs().pop_front();
            if let Some(job) = next {
                return Some(JobGuard { queue: self, job });
            }

            if self.is_closed() {
                return None;
            }

            notified.await;
        }
    }

    /// Waits until every job ever pushed has been resolved
    ///
    /// Returns immediately if nothing is in flight.
    pub async fn wait_drained(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Closes the queue, waking every idle worker
    ///
    /// Jobs still queued may be drained by workers; once empty, `pop`
    /// returns `None`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.available.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Jobs queued or being processed
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Jobs waiting to be picked up
    pub fn len(&self) -> usize {
        self.lock_jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_jobs().is_empty()
    }

    fn resolve(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, VecDeque<CrawlJob>> {
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JobGuard<'_> {
    pub fn job(&self) -> &CrawlJob {
        &self.job
    }
}

impl Deref for JobGuard<'_> {
    type Target = CrawlJob;

    fn deref(&self) -> &CrawlJob {
        &self.job
    }
}

impl Drop for JobGuard<'_> {
    fn drop(&mut self) {
        self.queue.resolve();
    }
}
