//! Transport abstraction used by the flush loop.
//!
//! The handler only needs to publish a text payload to a topic with a given
//! quality of service. Connection management, reconnection, and packet
//! acknowledgement all belong to the transport. With the `rumqttc` feature
//! enabled, [`rumqttc::AsyncClient`] implements [`Publisher`] directly.

use std::{future::Future, pin::Pin, time::Duration};

use thiserror::Error;

/// Boxed future returned by [`Publisher::publish`].
pub type PublishFuture<'a> = Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>>;

/// MQTT quality-of-service levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QoS {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl QoS {
    /// Numeric level as carried on the wire.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::AtMostOnce => 0,
            Self::AtLeastOnce => 1,
            Self::ExactlyOnce => 2,
        }
    }
}

/// A QoS level outside 0..=2.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("unsupported QoS level {0}; expected 0, 1, or 2")]
pub struct UnsupportedQoS(pub u8);

impl TryFrom<u8> for QoS {
    type Error = UnsupportedQoS;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::AtMostOnce),
            1 => Ok(Self::AtLeastOnce),
            2 => Ok(Self::ExactlyOnce),
            other => Err(UnsupportedQoS(other)),
        }
    }
}

/// Failures reported by a publish attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    /// The transport rejected or failed to send the message.
    #[error("transport error: {0}")]
    Transport(String),
    /// The publish call did not complete within the configured timeout.
    #[error("publish timed out after {0:?}")]
    TimedOut(Duration),
}

/// Asynchronous publish capability supplied by the transport.
///
/// The flush loop never calls `publish` concurrently for the same handler,
/// so implementations only need to tolerate sequential calls from one task
/// (plus whatever sharing the application does on its own).
pub trait Publisher: Send + Sync {
    /// Publish `payload` to `topic`.
    fn publish<'a>(&'a self, topic: &'a str, payload: String, qos: QoS) -> PublishFuture<'a>;
}

#[cfg(feature = "rumqttc")]
mod mqtt {
    use super::{PublishError, PublishFuture, Publisher, QoS};

    impl From<QoS> for rumqttc::QoS {
        fn from(qos: QoS) -> Self {
            match qos {
                QoS::AtMostOnce => rumqttc::QoS::AtMostOnce,
                QoS::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
                QoS::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
            }
        }
    }

    /// Queues the message on the client's request channel.
    ///
    /// Completion means the event loop accepted the request; delivery is
    /// then handled by whichever task polls the paired `rumqttc::EventLoop`.
    impl Publisher for rumqttc::AsyncClient {
        fn publish<'a>(&'a self, topic: &'a str, payload: String, qos: QoS) -> PublishFuture<'a> {
            Box::pin(async move {
                rumqttc::AsyncClient::publish(self, topic, qos.into(), false, payload.into_bytes())
                    .await
                    .map_err(|err| PublishError::Transport(err.to_string()))
            })
        }
    }
}
