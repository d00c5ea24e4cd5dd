//! Metrics hooks for IP set mutations
//!
//! Counts attempts and outcomes of the optimistic retry loop so contention
//! on a shared IP set is visible to operators.
//!
//! ## Usage
//!
//! ```ignore
//! use ipset_guard::metrics::Metrics;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(Metrics::new());
//! let service = IpSetService::new(store).with_metrics(metrics.clone());
//!
//! service.append_to_ip_set(&cancel, id, name, "192.0.2.44/32").await?;
//! println!("conflicts so far: {}", metrics.snapshot().conflicts);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for IP set mutations
#[derive(Default)]
pub struct Metrics {
    /// Fetch-modify-write cycles started
    pub attempts: AtomicU64,
    /// Operations that finished successfully
    pub successes: AtomicU64,
    /// Writes rejected for a stale lock token
    pub conflicts: AtomicU64,
    /// Operations that ran out of retries
    pub retries_exhausted: AtomicU64,
    /// Failed reads
    pub read_failures: AtomicU64,
    /// Failed writes other than version conflicts
    pub write_failures: AtomicU64,
    /// Operations aborted by the caller
    pub cancellations: AtomicU64,
    /// Writes skipped because the list did not change
    pub noop_writes_skipped: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            retries_exhausted: self.retries_exhausted.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            noop_writes_skipped: self.noop_writes_skipped.load(Ordering::Relaxed),
        }
    }

    /// Ratio of conflicting attempts to all attempts
    pub fn conflict_rate(&self) -> f64 {
        let attempts = self.attempts.load(Ordering::Relaxed);
        let conflicts = self.conflicts.load(Ordering::Relaxed);
        if attempts > 0 {
            conflicts as f64 / attempts as f64
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        self.attempts.store(0, Ordering::Relaxed);
        self.successes.store(0, Ordering::Relaxed);
        self.conflicts.store(0, Ordering::Relaxed);
        self.retries_exhausted.store(0, Ordering::Relaxed);
        self.read_failures.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.cancellations.store(0, Ordering::Relaxed);
        self.noop_writes_skipped.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub attempts: u64,
    pub successes: u64,
    pub conflicts: u64,
    pub retries_exhausted: u64,
    pub read_failures: u64,
    pub write_failures: u64,
    pub cancellations: u64,
    pub noop_writes_skipped: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to integrate with external metrics systems
/// like Prometheus, StatsD, or OpenTelemetry.
pub trait MetricsRecorder: Send + Sync {
    fn record_attempt(&self);
    fn record_success(&self);
    fn record_conflict(&self);
    fn record_retries_exhausted(&self);
    fn record_read_failure(&self);
    fn record_write_failure(&self);
    fn record_cancellation(&self);
    fn record_noop_write_skipped(&self);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_attempt(&self) {}
    fn record_success(&self) {}
    fn record_conflict(&self) {}
    fn record_retries_exhausted(&self) {}
    fn record_read_failure(&self) {}
    fn record_write_failure(&self) {}
    fn record_cancellation(&self) {}
    fn record_noop_write_skipped(&self) {}
}

impl MetricsRecorder for Metrics {
    fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    fn record_conflict(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    fn record_retries_exhausted(&self) {
        self.retries_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    fn record_noop_write_skipped(&self) {
        self.noop_writes_skipped.fetch_add(1, Ordering::Relaxed);
    }
}
