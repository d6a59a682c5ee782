//! Flush loop driving MQTT publishes.
//!
//! The loop waits on the flush trigger, swaps the buffer out, and publishes
//! the batch outside the buffer lock. Publish failures are contained here:
//! they are reported through the crate's diagnostics and the batch is
//! dropped, so the loop never exits because of the transport.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use log::{debug, warn};

use crate::publisher::PublishError;

use super::handler::Shared;

/// Result of a single flush cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The buffer was empty; nothing was published.
    Empty,
    /// The transport accepted a batch of this many lines.
    Published(usize),
    /// The publish failed and the batch of this many lines was dropped.
    Dropped(usize, PublishError),
}

/// The publishing half of an [`MqttHandler`](super::MqttHandler).
///
/// Exactly one loop exists per handler at a time; dropping it (including
/// by cancelling [`run`](Self::run)) releases the claim so a new loop can be
/// started.
pub struct FlushLoop {
    shared: Arc<Shared>,
}

impl FlushLoop {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Wait for flush triggers and publish batches until the handler stops.
    pub async fn run(self) {
        let shared = &self.shared;
        debug!(
            "MqttHandler flush loop started for topic '{}'",
            shared.config.topic
        );
        loop {
            tokio::select! {
                biased;
                () = shared.shutdown.wait() => break,
                () = shared.trigger.wait() => {
                    self.flush_once().await;
                }
            }
        }
        if shared.config.drain_on_shutdown {
            self.flush_once().await;
        } else {
            self.discard_pending();
        }
        shared.report_pending_drops();
        debug!(
            "MqttHandler flush loop stopped for topic '{}'",
            shared.config.topic
        );
    }

    /// Run one flush cycle: clear the trigger, drain the buffer, publish.
    ///
    /// The trigger is cleared before the buffer is swapped so a record that
    /// requests a flush while the publish is in flight is not forgotten.
    pub async fn flush_once(&self) -> FlushOutcome {
        let shared = &self.shared;
        shared.trigger.clear();
        let batch = shared.buffer.take();
        if batch.is_empty() {
            return FlushOutcome::Empty;
        }

        let lines = batch.len();
        let payload = batch.join("\n");
        match self.publish(payload).await {
            Ok(()) => {
                shared.stats.record_published(lines as u64);
                FlushOutcome::Published(lines)
            }
            Err(err) => {
                debug!(
                    "MqttHandler publish to '{}' failed: {err}",
                    shared.config.topic
                );
                shared.stats.record_failed(lines as u64);
                shared.warner.record_drops(lines as u64);
                shared.warn_dropped();
                FlushOutcome::Dropped(lines, err)
            }
        }
    }

    /// Drop whatever is still buffered at shutdown, counting it as lost.
    fn discard_pending(&self) {
        let shared = &self.shared;
        shared.trigger.clear();
        let lost = shared.buffer.take().len() as u64;
        if lost > 0 {
            shared.stats.record_dropped(lost);
            shared.warner.record_drops(lost);
        }
    }

    async fn publish(&self, payload: String) -> Result<(), PublishError> {
        let config = &self.shared.config;
        let publish = self
            .shared
            .publisher
            .publish(&config.topic, payload, config.qos);
        let Some(limit) = config.publish_timeout else {
            return publish.await;
        };
        match tokio::time::timeout(limit, publish).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "MqttHandler publish to '{}' exceeded {limit:?}",
                    config.topic
                );
                Err(PublishError::TimedOut(limit))
            }
        }
    }
}

impl Drop for FlushLoop {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for FlushLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushLoop")
            .field("topic", &self.shared.config.topic)
            .finish()
    }
}
