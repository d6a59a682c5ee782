//! Single-slot asynchronous signal.
//!
//! Used for both the flush trigger and the shutdown request. Setting an
//! already-set signal is a no-op, so a burst of emissions between two flush
//! cycles coalesces into one wake-up instead of queueing flush requests.

use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
pub(crate) struct Signal {
    set: AtomicBool,
    notify: Notify,
}

impl Signal {
    pub(crate) fn set(&self) {
        if !self.set.swap(true, Ordering::AcqRel) {
            self.notify.notify_waiters();
        }
    }

    pub(crate) fn clear(&self) {
        self.set.store(false, Ordering::Release);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }

    /// Suspend until the signal is set. Returns immediately if it already is.
    ///
    /// Cancel safe: dropping the future leaves the signal untouched.
    pub(crate) async fn wait(&self) {
        loop {
            let mut notified = pin!(self.notify.notified());
            // Register before checking so a concurrent `set` cannot slip
            // between the check and the await.
            notified.as_mut().enable();
            if self.is_set() {
                return;
            }
            notified.await;
        }
    }
}
