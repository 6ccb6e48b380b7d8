//! Per-host politeness delay
//!
//! The limiter remembers when each host was last requested and makes the
//! caller wait until the configured delay has passed since then. Hosts whose
//! last request is older than the delay no longer constrain anything and are
//! evicted on each call, keeping the map bounded on long multi-host crawls.

use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum delay between requests to the same host
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum time between two requests to one host
    delay: Duration,

    /// Last request time per host
    last_access: HashMap<String, Instant>,
}

impl RateLimiter {
    /// Creates a limiter with the given per-host delay
    ///
    /// A zero delay disables limiting entirely.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_access: HashMap::new(),
        }
    }

    /// Waits until `host` may be requested again, then records the request
    ///
    /// A host seen for the first time (or not within the last delay period)
    /// is not delayed.
    pub async fn wait(&mut self, host: &str) {
        if self.delay.is_zero() {
            return;
        }

        let now = Instant::now();
        self.evict_stale(now);

        if let Some(wait) = self.time_until_ready(host, now) {
            tracing::debug!("Waiting {:?} before requesting {}", wait, host);
            tokio::time::sleep(wait).await;
        }

        self.last_access.insert(host.to_string(), Instant::now());
    }

    /// Returns how long `host` must still wait at `now`, if at all
    pub fn time_until_ready(&self, host: &str, now: Instant) -> Option<Duration> {
        let last = self.last_access.get(host)?;
        let elapsed = now.saturating_duration_since(*last);
        self.delay
            .checked_sub(elapsed)
            .filter(|remaining| !remaining.is_zero())
    }

    /// Returns the number of hosts currently tracked
    pub fn tracked_hosts(&self) -> usize {
        self.last_access.len()
    }

    /// Forgets hosts whose last request is older than the delay
    fn evict_stale(&mut self, now: Instant) {
        let delay = self.delay;
        self.last_access
            .retain(|_, last| now.saturating_duration_since(*last) < delay);
    }
}
