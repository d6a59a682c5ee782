//! Fixtures pairing an [`MqttHandler`] with the channel its payloads arrive
//! on.

use std::sync::Arc;

use mqttlog::{MqttHandler, MqttHandlerBuilder, QoS};
use rstest::fixture;
use tokio::sync::mpsc;

use super::channel_publisher::ChannelPublisher;

pub type Payloads = mpsc::UnboundedReceiver<(String, String, QoS)>;

/// Handler on `logs/app` with the given capacity and default levels.
#[fixture]
pub fn handler_with_capacity(
    #[default(10)] capacity: usize,
) -> (MqttHandler, ChannelPublisher, Payloads) {
    let (publisher, rx) = ChannelPublisher::new();
    let handler = MqttHandlerBuilder::new("logs/app")
        .with_capacity(capacity)
        .build(Arc::new(publisher.clone()))
        .expect("valid handler");
    (handler, publisher, rx)
}
