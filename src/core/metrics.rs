//! Per-target metrics for observability
//!
//! Counters for events accepted, written, dropped under overflow and lost to
//! failed writes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one target
///
/// # Example
///
/// ```
/// use rust_log_pipeline::TargetMetrics;
///
/// let metrics = TargetMetrics::new();
///
/// metrics.record_enqueued();
/// metrics.record_written(1);
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.written(), 1);
/// ```
#[derive(Debug)]
pub struct TargetMetrics {
    /// Events accepted into the queue
    enqueued: AtomicU64,

    /// Events rendered and written to the sink
    written: AtomicU64,

    /// Events discarded by the overflow policy
    dropped: AtomicU64,

    /// Events lost because the sink write failed
    failed: AtomicU64,
}

impl TargetMetrics {
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            written: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Record an accepted event, returning the previous count
    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self, count: u64) -> u64 {
        self.written.fetch_add(count, Ordering::Relaxed)
    }

    /// Record a dropped event, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self, count: u64) -> u64 {
        self.failed.fetch_add(count, Ordering::Relaxed)
    }

    /// Drop rate as a percentage (0.0 - 100.0) of everything offered
    ///
    /// Returns 0.0 if nothing has been offered.
    pub fn drop_rate(&self) -> f64 {
        let dropped = self.dropped() as f64;
        let total = self.enqueued() as f64 + dropped;
        if total == 0.0 {
            0.0
        } else {
            (dropped / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.written.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }
}

impl Default for TargetMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TargetMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            written: AtomicU64::new(self.written()),
            dropped: AtomicU64::new(self.dropped()),
            failed: AtomicU64::new(self.failed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = TargetMetrics::new();
        assert_eq!(metrics.enqueued(), 0);
        assert_eq!(metrics.written(), 0);
        assert_eq!(metrics.dropped(), 0);
        assert_eq!(metrics.failed(), 0);
    }

    #[test]
    fn test_record_returns_previous() {
        let metrics = TargetMetrics::new();
        assert_eq!(metrics.record_dropped(), 0);
        assert_eq!(metrics.dropped(), 1);
        assert_eq!(metrics.record_written(10), 0);
        assert_eq!(metrics.record_written(5), 10);
        assert_eq!(metrics.written(), 15);
    }

    #[test]
    fn test_drop_rate() {
        let metrics = TargetMetrics::new();
        assert_eq!(metrics.drop_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_enqueued();
        }
        for _ in 0..10 {
            metrics.record_dropped();
        }

        let rate = metrics.drop_rate();
        assert!((9.9..=10.1).contains(&rate), "Drop rate was {}", rate);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let metrics = TargetMetrics::new();
        metrics.record_failed(2);

        let snapshot = metrics.clone();
        metrics.record_failed(1);

        assert_eq!(snapshot.failed(), 2);
        assert_eq!(metrics.failed(), 3);

        metrics.reset();
        assert_eq!(metrics.failed(), 0);
    }
}
