//! Metrics collection for the controller's packet-processing path.
//!
//! The primitives here are cheap atomics so that a snapshot can be cloned out
//! of a shared controller while it keeps processing. `PerformanceMetrics` is
//! the aggregate each controller owns.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/* ---------------------------------------------------------------- *
 * Simple Counter
 * ---------------------------------------------------------------- */

#[derive(Debug)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Counter {
    fn clone(&self) -> Self {
        let c = Counter::new();
        c.value.store(self.value(), Ordering::Relaxed);
        c
    }
}

/* ---------------------------------------------------------------- *
 * Latency histogram
 * ---------------------------------------------------------------- */

/// Fixed-bucket histogram. A sample lands in the first bucket whose upper
/// bound is `>=` the sample; anything larger than the last bound is overflow.
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<AtomicU64>,
    boundaries: Vec<u64>,
    overflow: AtomicU64,
    count: AtomicU64,
}

impl Histogram {
    pub fn new(boundaries: Vec<u64>) -> Self {
        let buckets = (0..boundaries.len()).map(|_| AtomicU64::new(0)).collect();

        Self {
            buckets,
            boundaries,
            overflow: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Buckets suited to in-memory packet processing, in microseconds.
    pub fn latency_us() -> Self {
        Self::new(vec![1, 5, 10, 50, 100, 500, 1_000, 10_000])
    }

    pub fn observe(&self, value: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);

        match self.boundaries.iter().position(|&b| value <= b) {
            Some(idx) => {
                self.buckets[idx].fetch_add(1, Ordering::Relaxed);
            }
            None => {
                self.overflow.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// `(upper bound, count)` per bucket, overflow excluded.
    pub fn counts(&self) -> Vec<(u64, u64)> {
        self.boundaries
            .iter()
            .zip(self.buckets.iter())
            .map(|(&b, bucket)| (b, bucket.load(Ordering::Relaxed)))
            .collect()
    }

    pub fn overflow(&self) -> u64 {
        self.overflow.load(Ordering::Relaxed)
    }

    /// Upper bound of the bucket holding the `q` quantile (`0.0..=1.0`).
    ///
    /// Returns `None` when no samples were observed or the quantile falls in
    /// the overflow bucket.
    pub fn quantile_upper_bound(&self, q: f64) -> Option<u64> {
        let total = self.count();
        if total == 0 {
            return None;
        }
        let rank = ((total as f64) * q.clamp(0.0, 1.0)).ceil().max(1.0) as u64;
        let mut seen = 0;
        for (bound, count) in self.counts() {
            seen += count;
            if seen >= rank {
                return Some(bound);
            }
        }
        None
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::latency_us()
    }
}

impl Clone for Histogram {
    fn clone(&self) -> Self {
        Self {
            buckets: self
                .buckets
                .iter()
                .map(|b| AtomicU64::new(b.load(Ordering::Relaxed)))
                .collect(),
            boundaries: self.boundaries.clone(),
            overflow: AtomicU64::new(self.overflow()),
            count: AtomicU64::new(self.count()),
        }
    }
}

/* ---------------------------------------------------------------- *
 * Aggregate metrics for a controller
 * ---------------------------------------------------------------- */

#[derive(Debug, Default, Clone)]
pub struct PerformanceMetrics {
    /// Wall-clock time of every `process_packet` call, in arrival order.
    processing_times: Vec<Duration>,

    // Flow table metrics
    pub flow_table_hits: Counter,
    pub flow_table_misses: Counter,
    /// Packets punted to the controller's reactive policy.
    pub controller_requests: Counter,
    pub rules_installed: Counter,
    pub packets_dropped: Counter,

    pub processing_latency_us: Histogram,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processing_time(&mut self, elapsed: Duration) {
        self.processing_latency_us
            .observe(elapsed.as_micros().min(u64::MAX as u128) as u64);
        self.processing_times.push(elapsed);
    }

    pub fn record_hit(&self) {
        self.flow_table_hits.increment();
    }

    /// A miss always turns into a controller request.
    pub fn record_miss(&self) {
        self.flow_table_misses.increment();
        self.controller_requests.increment();
    }

    pub fn processing_times(&self) -> &[Duration] {
        &self.processing_times
    }

    pub fn samples(&self) -> usize {
        self.processing_times.len()
    }

    /// Mean processing time in milliseconds, 0 when nothing was recorded.
    pub fn average_processing_time_ms(&self) -> f64 {
        if self.processing_times.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .processing_times
            .iter()
            .map(|d| d.as_secs_f64() * 1_000.0)
            .sum();
        total / self.processing_times.len() as f64
    }

    /// Percentage of packets that hit an installed rule, 0 with no traffic.
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.flow_table_hits.value();
        let total = hits + self.flow_table_misses.value();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64 * 100.0
        }
    }
}
