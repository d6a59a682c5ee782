//! Delivery counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of a handler's delivery counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HandlerStats {
    /// Batches the transport accepted.
    pub published_batches: u64,
    /// Lines contained in accepted batches.
    pub published_lines: u64,
    /// Batches whose publish failed or timed out.
    pub failed_batches: u64,
    /// Lines lost to failed publishes or emitted after shutdown.
    pub dropped_lines: u64,
    /// Lines evicted by the buffer ceiling.
    pub evicted_lines: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Stats {
    published_batches: AtomicU64,
    published_lines: AtomicU64,
    failed_batches: AtomicU64,
    dropped_lines: AtomicU64,
    evicted_lines: AtomicU64,
}

impl Stats {
    pub(crate) fn record_published(&self, lines: u64) {
        self.published_batches.fetch_add(1, Ordering::Relaxed);
        self.published_lines.fetch_add(lines, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self, lines: u64) {
        self.failed_batches.fetch_add(1, Ordering::Relaxed);
        self.record_dropped(lines);
    }

    pub(crate) fn record_dropped(&self, lines: u64) {
        self.dropped_lines.fetch_add(lines, Ordering::Relaxed);
    }

    pub(crate) fn record_evicted(&self) {
        self.evicted_lines.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> HandlerStats {
        HandlerStats {
            published_batches: self.published_batches.load(Ordering::Relaxed),
            published_lines: self.published_lines.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
            dropped_lines: self.dropped_lines.load(Ordering::Relaxed),
            evicted_lines: self.evicted_lines.load(Ordering::Relaxed),
        }
    }
}
