//! Shared search counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-wide search statistics, shared by every worker and the ticker.
///
/// `tries` counts attempts since the last drain; `hits` only ever grows.
#[derive(Debug)]
pub struct SearchStats {
    tries: AtomicU64,
    hits: AtomicU64,
    start_time: Instant,
}

impl SearchStats {
    /// Creates zeroed stats, starting the clock now.
    pub fn new() -> Self {
        Self {
            tries: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Counts one attempt.
    #[inline]
    pub fn record_try(&self) {
        self.tries.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes every attempt counted since the previous drain, resetting the
    /// counter to zero in the same atomic step.
    #[inline]
    pub fn drain_tries(&self) -> u64 {
        self.tries.swap(0, Ordering::Relaxed)
    }

    /// Returns attempts counted since the previous drain, without draining.
    pub fn pending_tries(&self) -> u64 {
        self.tries.load(Ordering::Relaxed)
    }

    /// Counts one hit and returns its 1-based ordinal.
    #[inline]
    pub fn record_hit(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the total hits found.
    pub fn total_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the time since the stats were created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for SearchStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Throughput for one reporting interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThroughputTick {
    /// Attempts made during the interval
    pub tries: u64,
    /// Attempts made since the search started
    pub total: u64,
}

/// Drains the try counter once per interval and keeps the running total.
#[derive(Debug, Default)]
pub struct ThroughputMeter {
    total: u64,
}

impl ThroughputMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains `stats` and folds the drained count into the running total.
    pub fn tick(&mut self, stats: &SearchStats) -> ThroughputTick {
        let tries = stats.drain_tries();
        self.total += tries;
        ThroughputTick {
            tries,
            total: self.total,
        }
    }

    /// Returns the attempts accumulated so far.
    pub fn total(&self) -> u64 {
        self.total
    }
}
