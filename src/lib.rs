//! Buffered log forwarding to an MQTT topic.
//!
//! Records are formatted and buffered synchronously by [`MqttHandler::emit`];
//! a [`FlushLoop`] running on a Tokio runtime publishes them in batches when
//! the buffer reaches capacity, a record at or above the flush level
//! arrives, or a flush is requested explicitly.

pub mod file_config;
pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod level;
#[cfg(feature = "log-compat")]
pub mod log_compat;
pub mod log_record;
pub mod mqtt_handler;
pub mod publisher;
pub mod rate_limited_warner;

#[cfg(test)]
mod test_utils;

pub use file_config::{ConfigError, builder_from_ini_file, builder_from_ini_str};
pub use formatter::{
    DefaultFormatter, JsonFormatter, MessageFormatter, RecordFormatter, SharedFormatter,
};
pub use handler::{HandlerError, LogHandler};
pub use handlers::{HandlerBuildError, MqttHandlerBuilder};
pub use level::{LogLevel, ParseLevelError};
#[cfg(feature = "log-compat")]
pub use log_compat::{InstallError, MqttLogBridge};
pub use log_record::{LogRecord, RecordMetadata};
pub use mqtt_handler::{FlushLoop, FlushOutcome, HandlerStats, MqttHandler, MqttHandlerConfig};
pub use publisher::{PublishError, PublishFuture, Publisher, QoS, UnsupportedQoS};
