//! Per-caller rate limiting.
//!
//! Limits are injected into the router as [`RateLimitPolicy`] trait objects
//! so tests can swap in [`Unlimited`] or drive a [`TokenBucketLimiter`] with a
//! [`ManualClock`] instead of sleeping.
//!
//! The token bucket is tracked as a theoretical arrival time (GCRA), which
//! admits the same traffic as a bucket of `capacity` tokens refilled evenly
//! over `period` but keeps all arithmetic in whole nanoseconds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Buckets are pruned once this many callers are tracked.
const PRUNE_THRESHOLD: usize = 10_000;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A request was refused; the caller may retry after `retry_after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimited {
    pub retry_after: Duration,
}

impl RateLimited {
    /// `retry_after` rounded up to whole seconds, for the `Retry-After` header.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        if self.retry_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Decides whether a caller may make another request now.
pub trait RateLimitPolicy: Send + Sync {
    fn check(&self, caller: &str) -> Result<(), RateLimited>;
}

/// Admits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl RateLimitPolicy for Unlimited {
    fn check(&self, _caller: &str) -> Result<(), RateLimited> {
        Ok(())
    }
}

/// `capacity` requests per `period`, refilled evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    capacity: u32,
    period: Duration,
}

impl Quota {
    /// # Panics
    /// Panics if `capacity` is zero or `period` is zero.
    pub fn new(capacity: u32, period: Duration) -> Self {
        assert!(capacity > 0, "quota capacity must be positive");
        assert!(!period.is_zero(), "quota period must be positive");
        Self { capacity, period }
    }

    pub fn per_minute(capacity: u32) -> Self {
        Self::new(capacity, Duration::from_secs(60))
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time for one token to refill.
    fn emission_interval(&self) -> Duration {
        self.period / self.capacity
    }

    /// How far ahead of now the arrival time may run before requests are refused.
    fn burst_tolerance(&self) -> Duration {
        self.period - self.emission_interval()
    }
}

/// Token bucket per caller key.
pub struct TokenBucketLimiter<C: Clock = SystemClock> {
    quota: Quota,
    clock: C,
    buckets: Mutex<HashMap<String, Instant>>,
}

impl TokenBucketLimiter<SystemClock> {
    pub fn new(quota: Quota) -> Self {
        Self::with_clock(quota, SystemClock)
    }
}

impl<C: Clock> TokenBucketLimiter<C> {
    pub fn with_clock(quota: Quota, clock: C) -> Self {
        Self {
            quota,
            clock,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn quota(&self) -> Quota {
        self.quota
    }

    /// Number of callers currently holding a partially drained bucket.
    pub fn tracked_callers(&self) -> usize {
        self.buckets.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<C: Clock> RateLimitPolicy for TokenBucketLimiter<C> {
    fn check(&self, caller: &str) -> Result<(), RateLimited> {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());

        if buckets.len() >= PRUNE_THRESHOLD {
            // A bucket whose arrival time has passed is full again.
            buckets.retain(|_, tat| *tat > now);
        }

        let tat = buckets.get(caller).copied().unwrap_or(now).max(now);
        let ahead = tat.duration_since(now);
        let tolerance = self.quota.burst_tolerance();

        if ahead > tolerance {
            return Err(RateLimited {
                retry_after: ahead - tolerance,
            });
        }

        buckets.insert(caller.to_string(), tat + self.quota.emission_interval());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(capacity: u32) -> (TokenBucketLimiter<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (
            TokenBucketLimiter::with_clock(Quota::per_minute(capacity), clock.clone()),
            clock,
        )
    }

    #[test]
    fn burst_up_to_capacity() {
        let (limiter, _) = limiter(5);
        for _ in 0..5 {
            assert!(limiter.check("1.2.3.4").is_ok());
        }
        let refused = limiter.check("1.2.3.4").unwrap_err();
        assert_eq!(refused.retry_after, Duration::from_secs(12));
        assert_eq!(refused.retry_after_secs(), 12);
    }

    #[test]
    fn refills_one_token_per_interval() {
        let (limiter, clock) = limiter(10);
        for _ in 0..10 {
            limiter.check("a").unwrap();
        }
        assert!(limiter.check("a").is_err());

        clock.advance(Duration::from_secs(5));
        let refused = limiter.check("a").unwrap_err();
        assert_eq!(refused.retry_after, Duration::from_secs(1));

        clock.advance(Duration::from_secs(1));
        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("a").is_err());
    }

    #[test]
    fn full_refill_after_period() {
        let (limiter, clock) = limiter(3);
        for _ in 0..3 {
            limiter.check("a").unwrap();
        }
        clock.advance(Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("a").is_ok());
        }
        assert!(limiter.check("a").is_err());
    }

    #[test]
    fn idle_time_does_not_bank_extra_tokens() {
        let (limiter, clock) = limiter(2);
        clock.advance(Duration::from_secs(3600));
        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("a").is_err());
    }

    #[test]
    fn callers_are_isolated() {
        let (limiter, _) = limiter(1);
        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("a").is_err());
        assert!(limiter.check("b").is_ok());
        assert_eq!(limiter.tracked_callers(), 2);
    }

    #[test]
    fn retry_after_rounds_up() {
        let limited = RateLimited {
            retry_after: Duration::from_millis(1500),
        };
        assert_eq!(limited.retry_after_secs(), 2);
    }

    #[test]
    fn unlimited_admits_everything() {
        for _ in 0..1000 {
            assert!(Unlimited.check("a").is_ok());
        }
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn zero_capacity_rejected() {
        let _ = Quota::per_minute(0);
    }
}
