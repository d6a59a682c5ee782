//! Rate-limited reporting of dropped log lines.
//!
//! The flush loop and the emit path can both lose lines (failed publishes,
//! evictions, records arriving after shutdown). Warning once per lost line
//! would flood the diagnostic channel during a broker outage, so drops are
//! counted and reported at most once per interval.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default interval between drop warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

/// Helper that rate limits dropped-line warnings.
///
/// Callers add to the counter via [`record_drops`](Self::record_drops). The
/// next call to [`warn_if_due`](Self::warn_if_due) invokes the callback with
/// the accumulated count if the interval has elapsed. [`flush`](Self::flush)
/// reports immediately.
#[derive(Debug)]
pub struct RateLimitedWarner {
    interval: Duration,
    last_warn: Mutex<Option<Instant>>,
    dropped: AtomicU64,
}

impl Default for RateLimitedWarner {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_INTERVAL)
    }
}

impl RateLimitedWarner {
    /// Create a warner. The first warning can be emitted immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_warn: Mutex::new(None),
            dropped: AtomicU64::new(0),
        }
    }

    /// Increment the dropped-line counter by one.
    pub fn record_drop(&self) {
        self.record_drops(1);
    }

    /// Increment the dropped-line counter by `count`.
    pub fn record_drops(&self, count: u64) {
        self.dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Emit a warning if the interval has elapsed since the last one.
    pub fn warn_if_due(&self, warn: impl FnOnce(u64)) {
        let now = Instant::now();
        let mut last = self.last_warn.lock();
        if last.is_some_and(|prev| now.duration_since(prev) < self.interval) {
            return;
        }
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            *last = Some(now);
        }
    }

    /// Immediately warn about any dropped lines.
    pub fn flush(&self, warn: impl FnOnce(u64)) {
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            *self.last_warn.lock() = Some(Instant::now());
        }
    }
}
