//! Global rate limiting for fetch starts

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use std::num::NonZeroU32;
use tokio_util::sync::CancellationToken;

type DirectLimiter = governor::RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Token bucket shared by every worker
///
/// Admits `rate` fetch starts per second with a burst capacity of `rate`.
pub struct RateLimiter {
    limiter: DirectLimiter,
    rate: NonZeroU32,
}

impl RateLimiter {
    /// Creates a limiter for `rate` requests per second
    ///
    /// A rate of zero is treated as one.
    pub fn per_second(rate: u32) -> Self {
        let rate = NonZeroU32::new(rate).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: governor::RateLimiter::direct(Quota::per_second(rate)),
            rate,
        }
    }

    pub fn rate(&self) -> u32 {
        self.rate.get()
    }

    /// Waits for a token
    ///
    /// Returns `false` without consuming a token if `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = self.limiter.until_ready() => true,
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate", &self.rate)
            .finish()
    }
}
