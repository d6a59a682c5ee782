//! A publisher that records every attempt for later inspection.
//!
//! Successful publishes are also sent over a channel so async tests can
//! await them instead of sleeping. Failures and hangs can be injected for
//! the next N calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::publisher::{PublishError, PublishFuture, Publisher, QoS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Published {
    pub(crate) topic: String,
    pub(crate) payload: String,
    pub(crate) qos: QoS,
}

struct Inner {
    tx: mpsc::UnboundedSender<Published>,
    attempts: Mutex<Vec<Published>>,
    fail_next: AtomicUsize,
    hang_next: AtomicUsize,
}

#[derive(Clone)]
pub(crate) struct RecordingPublisher {
    inner: Arc<Inner>,
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        .is_ok()
}

impl RecordingPublisher {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<Published>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Inner {
            tx,
            attempts: Mutex::new(Vec::new()),
            fail_next: AtomicUsize::new(0),
            hang_next: AtomicUsize::new(0),
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    /// Fail the next `n` publish calls with a transport error.
    pub(crate) fn fail_next(&self, n: usize) {
        self.inner.fail_next.store(n, Ordering::Release);
    }

    /// Never complete the next `n` publish calls.
    pub(crate) fn hang_next(&self, n: usize) {
        self.inner.hang_next.store(n, Ordering::Release);
    }

    /// Every publish attempt, successful or not.
    pub(crate) fn attempts(&self) -> Vec<Published> {
        self.inner.attempts.lock().clone()
    }
}

impl Publisher for RecordingPublisher {
    fn publish<'a>(&'a self, topic: &'a str, payload: String, qos: QoS) -> PublishFuture<'a> {
        Box::pin(async move {
            let message = Published {
                topic: topic.to_owned(),
                payload,
                qos,
            };
            self.inner.attempts.lock().push(message.clone());
            if take_one(&self.inner.hang_next) {
                std::future::pending::<()>().await;
            }
            if take_one(&self.inner.fail_next) {
                return Err(PublishError::Transport("injected failure".into()));
            }
            let _ = self.inner.tx.send(message);
            Ok(())
        })
    }
}

/// Await the next successful publish, failing the test after one second.
pub(crate) async fn next_publish(rx: &mut mpsc::UnboundedReceiver<Published>) -> Published {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("publish within timeout")
        .expect("publisher channel open")
}

/// Poll `condition` until it holds, failing the test after one second.
pub(crate) async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition met within timeout");
}
