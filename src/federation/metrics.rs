//! Metrics collection for federated search operations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Snapshot of metrics collected across federated searches.
#[derive(Debug, Clone)]
pub struct FederationMetrics {
    /// Total number of federated searches executed.
    pub total_searches: u64,

    /// Searches where every provider succeeded.
    pub complete_searches: u64,

    /// Searches that returned with at least one provider skipped.
    pub partial_searches: u64,

    /// Provider calls skipped over all searches.
    pub provider_failures: u64,

    /// Provider calls cut off by the timeout budget.
    pub provider_timeouts: u64,

    /// Total matches returned.
    pub total_matches: u64,

    /// Total execution time across all searches.
    pub total_execution_time: Duration,

    /// Average execution time per search.
    pub avg_execution_time: Duration,

    /// Maximum execution time observed.
    pub max_execution_time: Duration,
}

impl Default for FederationMetrics {
    fn default() -> Self {
        Self {
            total_searches: 0,
            complete_searches: 0,
            partial_searches: 0,
            provider_failures: 0,
            provider_timeouts: 0,
            total_matches: 0,
            total_execution_time: Duration::ZERO,
            avg_execution_time: Duration::ZERO,
            max_execution_time: Duration::ZERO,
        }
    }
}

/// Thread-safe collector backing [`FederationMetrics`] snapshots.
pub struct FederationMetricsCollector {
    total_searches: AtomicU64,
    complete_searches: AtomicU64,
    partial_searches: AtomicU64,
    provider_failures: AtomicU64,
    provider_timeouts: AtomicU64,
    total_matches: AtomicU64,
    total_execution_nanos: AtomicU64,
    max_execution_nanos: AtomicU64,
}

impl FederationMetricsCollector {
    /// Create a new collector.
    pub fn new() -> Self {
        Self {
            total_searches: AtomicU64::new(0),
            complete_searches: AtomicU64::new(0),
            partial_searches: AtomicU64::new(0),
            provider_failures: AtomicU64::new(0),
            provider_timeouts: AtomicU64::new(0),
            total_matches: AtomicU64::new(0),
            total_execution_nanos: AtomicU64::new(0),
            max_execution_nanos: AtomicU64::new(0),
        }
    }

    /// Record one federated search.
    pub fn record_search(
        &self,
        execution_time: Duration,
        matches: u64,
        failures: u64,
        timeouts: u64,
    ) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
        if failures == 0 {
            self.complete_searches.fetch_add(1, Ordering::Relaxed);
        } else {
            self.partial_searches.fetch_add(1, Ordering::Relaxed);
        }
        self.provider_failures.fetch_add(failures, Ordering::Relaxed);
        self.provider_timeouts.fetch_add(timeouts, Ordering::Relaxed);
        self.total_matches.fetch_add(matches, Ordering::Relaxed);

        let nanos = execution_time.as_nanos() as u64;
        self.total_execution_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.max_execution_nanos.fetch_max(nanos, Ordering::Relaxed);
    }

    /// Take a snapshot of the current metrics.
    pub fn snapshot(&self) -> FederationMetrics {
        let total_searches = self.total_searches.load(Ordering::Relaxed);
        let total_nanos = self.total_execution_nanos.load(Ordering::Relaxed);
        let avg_nanos = if total_searches > 0 {
            total_nanos / total_searches
        } else {
            0
        };

        FederationMetrics {
            total_searches,
            complete_searches: self.complete_searches.load(Ordering::Relaxed),
            partial_searches: self.partial_searches.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            provider_timeouts: self.provider_timeouts.load(Ordering::Relaxed),
            total_matches: self.total_matches.load(Ordering::Relaxed),
            total_execution_time: Duration::from_nanos(total_nanos),
            avg_execution_time: Duration::from_nanos(avg_nanos),
            max_execution_time: Duration::from_nanos(
                self.max_execution_nanos.load(Ordering::Relaxed),
            ),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.total_searches.store(0, Ordering::Relaxed);
        self.complete_searches.store(0, Ordering::Relaxed);
        self.partial_searches.store(0, Ordering::Relaxed);
        self.provider_failures.store(0, Ordering::Relaxed);
        self.provider_timeouts.store(0, Ordering::Relaxed);
        self.total_matches.store(0, Ordering::Relaxed);
        self.total_execution_nanos.store(0, Ordering::Relaxed);
        self.max_execution_nanos.store(0, Ordering::Relaxed);
    }
}

impl Default for FederationMetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple timer for measuring execution time.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed time without stopping.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let collector = FederationMetricsCollector::new();
        collector.record_search(Duration::from_millis(10), 3, 0, 0);
        collector.record_search(Duration::from_millis(30), 1, 2, 1);

        let metrics = collector.snapshot();
        assert_eq!(metrics.total_searches, 2);
        assert_eq!(metrics.complete_searches, 1);
        assert_eq!(metrics.partial_searches, 1);
        assert_eq!(metrics.provider_failures, 2);
        assert_eq!(metrics.provider_timeouts, 1);
        assert_eq!(metrics.total_matches, 4);
        assert_eq!(metrics.max_execution_time, Duration::from_millis(30));
        assert_eq!(metrics.avg_execution_time, Duration::from_millis(20));
    }

    #[test]
    fn test_reset() {
        let collector = FederationMetricsCollector::new();
        collector.record_search(Duration::from_millis(10), 1, 1, 0);
        collector.reset();

        let metrics = collector.snapshot();
        assert_eq!(metrics.total_searches, 0);
        assert_eq!(metrics.provider_failures, 0);
        assert_eq!(metrics.total_execution_time, Duration::ZERO);
    }
}
