//! A [`Publisher`] that forwards payloads over a Tokio channel so tests can
//! observe what the flush loop sends without a broker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use mqttlog::{PublishError, PublishFuture, Publisher, QoS};
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<(String, String, QoS)>,
    offline: Arc<AtomicBool>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(String, String, QoS)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                offline: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// Make every publish fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

impl Publisher for ChannelPublisher {
    fn publish<'a>(&'a self, topic: &'a str, payload: String, qos: QoS) -> PublishFuture<'a> {
        Box::pin(async move {
            if self.offline.load(Ordering::SeqCst) {
                return Err(PublishError::Transport("broker unreachable".into()));
            }
            self.tx
                .send((topic.to_owned(), payload, qos))
                .map_err(|err| PublishError::Transport(err.to_string()))
        })
    }
}

/// Await the next published payload, panicking after one second.
pub async fn next_payload(rx: &mut mpsc::UnboundedReceiver<(String, String, QoS)>) -> String {
    let (_, payload, _) = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("publish within timeout")
        .expect("publisher alive");
    payload
}
