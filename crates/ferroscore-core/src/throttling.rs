//! Outbound call admission for rate-limited data providers.

use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use tracing::debug;

use crate::config::{RateLimitConfig, RateLimitStrategy};

/// Pluggable quota policy consumed by scorers that call external APIs.
pub trait QuotaPolicy: Send + Sync {
    /// Blocks the calling thread until one more call fits in the quota.
    fn wait_if_needed(&self);
}

/// Builds the quota policy selected by `config`.
pub fn quota_from_config(config: &RateLimitConfig) -> Box<dyn QuotaPolicy> {
    match config.strategy {
        RateLimitStrategy::SlidingWindow => Box::new(SlidingWindowLimiter::from_config(config)),
        RateLimitStrategy::Smoothed => Box::new(SmoothedQuota::from_config(config)),
    }
}

/// Sliding-window limiter: at most `calls` admissions within any trailing `period`.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    calls: usize,
    period: Duration,
    history: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    pub fn new(calls: u32, period: Duration) -> Self {
        let calls = calls.max(1) as usize;
        Self {
            calls,
            period,
            history: Mutex::new(VecDeque::with_capacity(calls)),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.calls, config.period())
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Admits the call immediately when the window has room, otherwise sleeps
    /// until the oldest recorded call ages out.
    pub fn wait_if_needed(&self) {
        loop {
            let wait = {
                let mut history = self
                    .history
                    .lock()
                    .expect("rate limiter history should not be poisoned");
                let now = Instant::now();
                prune(&mut history, now, self.period);

                if history.len() < self.calls {
                    history.push_back(now);
                    return;
                }

                match history.front() {
                    Some(oldest) => (*oldest + self.period).saturating_duration_since(now),
                    None => Duration::ZERO,
                }
            };

            debug!(
                wait_ms = wait.as_millis() as u64,
                calls = self.calls,
                period_ms = self.period.as_millis() as u64,
                "rate limit reached, waiting"
            );
            thread::sleep(wait);
        }
    }

    /// Number of calls recorded in the current trailing window.
    pub fn calls_in_window(&self) -> usize {
        let mut history = self
            .history
            .lock()
            .expect("rate limiter history should not be poisoned");
        prune(&mut history, Instant::now(), self.period);
        history.len()
    }

    /// Scoped admission: waits on creation, releases nothing on drop.
    pub fn acquire(&self) -> RateLimitGuard<'_> {
        self.wait_if_needed();
        RateLimitGuard { _limiter: self }
    }

    /// Runs `f` once the quota admits it.
    pub fn call<R>(&self, f: impl FnOnce() -> R) -> R {
        self.wait_if_needed();
        f()
    }

    /// Wraps `f` so every invocation first waits for quota.
    pub fn wrap<'a, A, R, F>(&'a self, f: F) -> impl Fn(A) -> R + 'a
    where
        F: Fn(A) -> R + 'a,
    {
        move |args| {
            self.wait_if_needed();
            f(args)
        }
    }
}

impl QuotaPolicy for SlidingWindowLimiter {
    fn wait_if_needed(&self) {
        SlidingWindowLimiter::wait_if_needed(self);
    }
}

fn prune(history: &mut VecDeque<Instant>, now: Instant, period: Duration) {
    while let Some(oldest) = history.front() {
        if now.saturating_duration_since(*oldest) >= period {
            history.pop_front();
        } else {
            break;
        }
    }
}

/// Guard returned by [`SlidingWindowLimiter::acquire`].
#[must_use = "the guard marks a quota-admitted scope"]
pub struct RateLimitGuard<'a> {
    _limiter: &'a SlidingWindowLimiter,
}

/// GCRA quota that spreads `calls` per `period` evenly, allowing a burst of `calls`.
pub struct SmoothedQuota {
    limiter: DirectRateLimiter,
    clock: DefaultClock,
}

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

impl SmoothedQuota {
    pub fn new(calls: u32, period: Duration) -> Self {
        Self {
            limiter: RateLimiter::direct(quota_from_window(period, calls)),
            clock: DefaultClock::default(),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.calls, config.period())
    }

    /// Non-blocking check; `Err` carries how long to wait before retrying.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }
}

impl QuotaPolicy for SmoothedQuota {
    fn wait_if_needed(&self) {
        while let Err(wait) = self.try_acquire() {
            debug!(wait_ms = wait.as_millis() as u64, "smoothed quota exhausted, waiting");
            thread::sleep(wait);
        }
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let safe_limit = quota_limit.max(1);
    let burst = NonZeroU32::new(safe_limit).unwrap_or(NonZeroU32::MIN);

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}
