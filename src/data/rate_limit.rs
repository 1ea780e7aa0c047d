use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::time::Duration;

/// Enforces a minimum gap between consecutive gateway calls
///
/// A GCRA limiter with a burst of one. The first permit is spent at
/// construction, so the very first call also waits out whatever part of
/// the interval has not yet elapsed.
pub struct MinIntervalLimiter {
    limiter: DefaultDirectRateLimiter,
    clock: DefaultClock,
}

impl MinIntervalLimiter {
    pub fn new(min_interval: Duration) -> Self {
        // A zero interval means no limit
        let quota = Quota::with_period(min_interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX));
        let limiter = DefaultDirectRateLimiter::direct(quota);
        let _ = limiter.check();

        Self {
            limiter,
            clock: DefaultClock::default(),
        }
    }

    /// Wait for a permit and take it. Returns the expected wait.
    pub async fn until_ready(&self) -> Duration {
        match self.limiter.check() {
            Ok(()) => Duration::ZERO,
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.clock.now());
                tracing::debug!(wait_ms = wait.as_millis() as u64, "Rate limit wait");
                self.limiter.until_ready().await;
                wait
            }
        }
    }
}
