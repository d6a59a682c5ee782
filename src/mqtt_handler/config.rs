//! Configuration consumed by the MQTT handler lifecycle.
//!
//! [`MqttHandlerBuilder`](crate::handlers::MqttHandlerBuilder) validates and
//! constructs these values before passing them to
//! [`MqttHandler`](super::MqttHandler).

use std::num::NonZeroUsize;
use std::time::Duration;

use crate::level::LogLevel;
use crate::publisher::QoS;
use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

/// Number of buffered lines that forces a flush.
pub const DEFAULT_CAPACITY: usize = 10;
/// Minimum level accepted by the handler.
pub const DEFAULT_LEVEL: LogLevel = LogLevel::Info;
/// Level at which a single record forces a flush.
pub const DEFAULT_FLUSH_LEVEL: LogLevel = LogLevel::Error;
/// Upper bound on a single publish call.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved handler settings.
#[derive(Clone, Debug)]
pub struct MqttHandlerConfig {
    /// Topic every batch is published to.
    pub topic: String,
    /// Quality of service passed to the transport.
    pub qos: QoS,
    /// Minimum level the handler accepts from dispatchers.
    pub level: LogLevel,
    /// Records at or above this level trigger an immediate flush.
    pub flush_level: LogLevel,
    /// Buffer length that triggers a flush.
    pub capacity: NonZeroUsize,
    /// Hard ceiling on buffered lines; the oldest line is evicted past it.
    pub max_buffered: Option<NonZeroUsize>,
    /// Timeout applied to each publish call. `None` waits indefinitely.
    pub publish_timeout: Option<Duration>,
    /// Run one last flush cycle when the loop is stopped.
    pub drain_on_shutdown: bool,
    /// Interval between rate-limited drop warnings.
    pub warn_interval: Duration,
}

impl MqttHandlerConfig {
    /// Configuration with default settings for `topic`.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            qos: QoS::default(),
            level: DEFAULT_LEVEL,
            flush_level: DEFAULT_FLUSH_LEVEL,
            capacity: NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            max_buffered: None,
            publish_timeout: Some(DEFAULT_PUBLISH_TIMEOUT),
            drain_on_shutdown: false,
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}
