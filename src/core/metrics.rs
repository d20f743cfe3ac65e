//! Pipeline metrics for observability
//!
//! Counters are shared between producers (submissions, session flushes) and
//! the consumer (everything else).

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for pipeline observability
///
/// # Example
///
/// ```
/// use log_pipeline::PipelineMetrics;
///
/// let metrics = PipelineMetrics::new();
///
/// metrics.record_submitted();
/// metrics.record_suppressed();
///
/// assert_eq!(metrics.submitted(), 1);
/// assert_eq!(metrics.suppressed(), 1);
/// ```
#[derive(Debug)]
pub struct PipelineMetrics {
    /// Entries pushed into the ingestion queue
    submitted: AtomicU64,

    /// Entries handed to the sink fan-out
    dispatched: AtomicU64,

    /// Entries dropped for being below the minimum level or empty
    filtered: AtomicU64,

    /// Duplicates swallowed by repeat suppression
    suppressed: AtomicU64,

    /// Individual sink failures, including panics
    sink_failures: AtomicU64,

    /// Failure reports dropped because they failed themselves
    self_logs_dropped: AtomicU64,

    /// Non-empty consumer cycles
    cycles: AtomicU64,

    /// Session flushes discarded for finishing under the minimum interval
    sessions_discarded: AtomicU64,
}

impl PipelineMetrics {
    pub const fn new() -> Self {
        Self {
            submitted: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            self_logs_dropped: AtomicU64::new(0),
            cycles: AtomicU64::new(0),
            sessions_discarded: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn suppressed(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn self_logs_dropped(&self) -> u64 {
        self.self_logs_dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sessions_discarded(&self) -> u64 {
        self.sessions_discarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_submitted(&self) -> u64 {
        self.submitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_suppressed(&self) -> u64 {
        self.suppressed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_self_log_dropped(&self) -> u64 {
        self.self_logs_dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_cycle(&self) -> u64 {
        self.cycles.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_session_discarded(&self) -> u64 {
        self.sessions_discarded.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of evaluated entries swallowed by repeat suppression (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been dispatched or suppressed yet.
    pub fn suppression_rate(&self) -> f64 {
        let suppressed = self.suppressed() as f64;
        let total = self.dispatched() as f64 + suppressed;
        if total == 0.0 {
            0.0
        } else {
            (suppressed / total) * 100.0
        }
    }

    pub fn reset(&self) {
        self.submitted.store(0, Ordering::Relaxed);
        self.dispatched.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.suppressed.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.self_logs_dropped.store(0, Ordering::Relaxed);
        self.cycles.store(0, Ordering::Relaxed);
        self.sessions_discarded.store(0, Ordering::Relaxed);
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PipelineMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            submitted: AtomicU64::new(self.submitted()),
            dispatched: AtomicU64::new(self.dispatched()),
            filtered: AtomicU64::new(self.filtered()),
            suppressed: AtomicU64::new(self.suppressed()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            self_logs_dropped: AtomicU64::new(self.self_logs_dropped()),
            cycles: AtomicU64::new(self.cycles()),
            sessions_discarded: AtomicU64::new(self.sessions_discarded()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.submitted(), 0);
        assert_eq!(metrics.dispatched(), 0);
        assert_eq!(metrics.filtered(), 0);
        assert_eq!(metrics.suppressed(), 0);
        assert_eq!(metrics.sink_failures(), 0);
        assert_eq!(metrics.cycles(), 0);
    }

    #[test]
    fn test_record_returns_previous() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.record_dispatched(), 0);
        assert_eq!(metrics.record_dispatched(), 1);
        assert_eq!(metrics.dispatched(), 2);
    }

    #[test]
    fn test_suppression_rate() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.suppression_rate(), 0.0);

        for _ in 0..3 {
            metrics.record_dispatched();
        }
        metrics.record_suppressed();

        let rate = metrics.suppression_rate();
        assert!((24.9..=25.1).contains(&rate), "Suppression rate was {}", rate);
    }

    #[test]
    fn test_reset_and_snapshot() {
        let metrics = PipelineMetrics::new();
        metrics.record_submitted();
        metrics.record_sink_failure();

        let snapshot = metrics.clone();
        metrics.reset();

        assert_eq!(metrics.submitted(), 0);
        assert_eq!(metrics.sink_failures(), 0);
        assert_eq!(snapshot.submitted(), 1);
        assert_eq!(snapshot.sink_failures(), 1);
    }
}
