//! Builder for [`MqttHandler`](crate::mqtt_handler::MqttHandler).
//!
//! Exposes the publish parameters (topic and QoS), the level pair that
//! decides which records are accepted and which force a flush, buffer
//! sizing, and the publish timeout.

use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use crate::{
    formatter::{RecordFormatter, SharedFormatter},
    level::LogLevel,
    mqtt_handler::{MqttHandler, MqttHandlerConfig},
    publisher::{Publisher, QoS},
};

use super::HandlerBuildError;

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(HandlerBuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`MqttHandler`] instances.
#[derive(Clone, Debug, Default)]
pub struct MqttHandlerBuilder {
    topic: String,
    qos: QoS,
    level: Option<LogLevel>,
    flush_level: Option<LogLevel>,
    capacity: Option<usize>,
    max_buffered: Option<usize>,
    publish_timeout_ms: Option<u64>,
    no_publish_timeout: bool,
    drain_on_shutdown: bool,
    warn_interval_ms: Option<u64>,
    formatter: Option<SharedFormatter>,
}

impl MqttHandlerBuilder {
    /// Create a builder publishing to `topic`.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    /// Set the quality of service used for every publish. Defaults to QoS 0.
    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }

    option_setter!(
        #[doc = "Set the minimum level accepted by the handler. Defaults to INFO."]
        with_level,
        level,
        LogLevel
    );
    option_setter!(
        #[doc = "Set the level that forces an immediate flush. Defaults to ERROR."]
        with_flush_level,
        flush_level,
        LogLevel
    );
    option_setter!(
        #[doc = "Set the buffer length that forces a flush. Defaults to 10."]
        with_capacity,
        capacity,
        usize
    );
    option_setter!(
        #[doc = "Cap the buffer, evicting the oldest line beyond `value`."]
        with_max_buffered,
        max_buffered,
        usize
    );
    option_setter!(
        #[doc = "Set the per-publish timeout in milliseconds. Defaults to 30 000."]
        with_publish_timeout_ms,
        publish_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the interval between drop warnings in milliseconds."]
        with_warn_interval_ms,
        warn_interval_ms,
        u64
    );

    /// Let publish calls run for as long as the transport takes.
    ///
    /// A hung transport then stalls every later flush of this handler.
    pub fn without_publish_timeout(mut self) -> Self {
        self.no_publish_timeout = true;
        self
    }

    /// Publish whatever is still buffered when the flush loop is stopped.
    pub fn with_drain_on_shutdown(mut self, drain: bool) -> Self {
        self.drain_on_shutdown = drain;
        self
    }

    /// Use `formatter` to render records. Defaults to the message only.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: RecordFormatter + 'static,
    {
        self.formatter = Some(SharedFormatter::new(formatter));
        self
    }

    /// Use an already shared formatter.
    pub fn with_shared_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    fn validate(&self) -> Result<(), HandlerBuildError> {
        self.validate_topic()?;
        self.validate_levels()?;
        self.validate_sizes()?;
        self.validate_timeouts()?;
        Ok(())
    }

    fn validate_topic(&self) -> Result<(), HandlerBuildError> {
        if self.topic.trim().is_empty() {
            return Err(HandlerBuildError::InvalidConfig(
                "topic must not be empty".into(),
            ));
        }
        if self.topic.contains(['+', '#']) {
            return Err(HandlerBuildError::InvalidConfig(format!(
                "topic '{}' must not contain wildcards",
                self.topic
            )));
        }
        Ok(())
    }

    fn validate_levels(&self) -> Result<(), HandlerBuildError> {
        let defaults = MqttHandlerConfig::new("");
        let level = self.level.unwrap_or(defaults.level);
        let flush_level = self.flush_level.unwrap_or(defaults.flush_level);
        if flush_level < level {
            return Err(HandlerBuildError::InvalidConfig(format!(
                "flush level {flush_level} must be greater than or equal to level {level}"
            )));
        }
        Ok(())
    }

    fn validate_sizes(&self) -> Result<(), HandlerBuildError> {
        if let Some(capacity) = self.capacity {
            ensure_positive!(capacity, "capacity")?;
        }
        if let Some(max_buffered) = self.max_buffered {
            ensure_positive!(max_buffered, "max_buffered")?;
            let capacity = self
                .capacity
                .unwrap_or(MqttHandlerConfig::new("").capacity.get());
            if max_buffered < capacity {
                return Err(HandlerBuildError::InvalidConfig(format!(
                    "max_buffered ({max_buffered}) must not be smaller than capacity ({capacity})"
                )));
            }
        }
        Ok(())
    }

    fn validate_timeouts(&self) -> Result<(), HandlerBuildError> {
        if let Some(timeout) = self.publish_timeout_ms {
            ensure_positive!(timeout, "publish_timeout_ms")?;
        }
        Ok(())
    }

    /// Validate the settings and resolve them into a configuration.
    pub fn build_config(&self) -> Result<MqttHandlerConfig, HandlerBuildError> {
        self.validate()?;

        let defaults = MqttHandlerConfig::new(self.topic.clone());
        let publish_timeout = if self.no_publish_timeout {
            None
        } else {
            self.publish_timeout_ms
                .map(Duration::from_millis)
                .or(defaults.publish_timeout)
        };
        Ok(MqttHandlerConfig {
            qos: self.qos,
            level: self.level.unwrap_or(defaults.level),
            flush_level: self.flush_level.unwrap_or(defaults.flush_level),
            capacity: self
                .capacity
                .and_then(NonZeroUsize::new)
                .unwrap_or(defaults.capacity),
            max_buffered: self.max_buffered.and_then(NonZeroUsize::new),
            publish_timeout,
            drain_on_shutdown: self.drain_on_shutdown,
            warn_interval: self
                .warn_interval_ms
                .map_or(defaults.warn_interval, Duration::from_millis),
            ..defaults
        })
    }

    /// Build a handler publishing through `publisher`.
    pub fn build(&self, publisher: Arc<dyn Publisher>) -> Result<MqttHandler, HandlerBuildError> {
        let config = self.build_config()?;
        let formatter = self.formatter.clone().unwrap_or_default();
        Ok(MqttHandler::from_parts(config, formatter, publisher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn invalid(builder: MqttHandlerBuilder) -> String {
        match builder.build_config() {
            Err(HandlerBuildError::InvalidConfig(msg)) => msg,
            Ok(config) => panic!("expected invalid configuration, got {config:?}"),
        }
    }

    #[test]
    fn defaults_match_handler_contract() {
        let config = MqttHandlerBuilder::new("logs/app")
            .build_config()
            .expect("valid");
        assert_eq!(config.topic, "logs/app");
        assert_eq!(config.qos, QoS::AtMostOnce);
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.flush_level, LogLevel::Error);
        assert_eq!(config.capacity.get(), 10);
        assert_eq!(config.max_buffered, None);
        assert_eq!(config.publish_timeout, Some(Duration::from_secs(30)));
        assert!(!config.drain_on_shutdown);
    }

    #[test]
    fn flush_level_below_level_is_rejected() {
        let msg = invalid(
            MqttHandlerBuilder::new("logs")
                .with_level(LogLevel::Warn)
                .with_flush_level(LogLevel::Info),
        );
        assert!(msg.contains("flush level INFO"));
    }

    #[test]
    fn equal_levels_are_accepted() {
        let config = MqttHandlerBuilder::new("logs")
            .with_level(LogLevel::Warn)
            .with_flush_level(LogLevel::Warn)
            .build_config()
            .expect("valid");
        assert_eq!(config.flush_level, LogLevel::Warn);
    }

    #[rstest]
    #[case(MqttHandlerBuilder::new("logs").with_capacity(0), "capacity must be greater than zero")]
    #[case(MqttHandlerBuilder::new("logs").with_max_buffered(0), "max_buffered must be greater than zero")]
    #[case(MqttHandlerBuilder::new("logs").with_publish_timeout_ms(0), "publish_timeout_ms must be greater than zero")]
    #[case(MqttHandlerBuilder::new(" "), "topic must not be empty")]
    #[case(MqttHandlerBuilder::new("logs/#"), "must not contain wildcards")]
    #[case(
        MqttHandlerBuilder::new("logs").with_capacity(20).with_max_buffered(5),
        "must not be smaller than capacity"
    )]
    fn rejects_invalid_settings(#[case] builder: MqttHandlerBuilder, #[case] expected: &str) {
        let msg = invalid(builder);
        assert!(msg.contains(expected), "unexpected message: {msg}");
    }

    #[test]
    fn publish_timeout_can_be_disabled() {
        let config = MqttHandlerBuilder::new("logs")
            .with_publish_timeout_ms(10)
            .without_publish_timeout()
            .build_config()
            .expect("valid");
        assert_eq!(config.publish_timeout, None);
    }

    #[test]
    fn overrides_are_applied() {
        let config = MqttHandlerBuilder::new("logs")
            .with_qos(QoS::ExactlyOnce)
            .with_capacity(3)
            .with_max_buffered(6)
            .with_publish_timeout_ms(250)
            .with_warn_interval_ms(0)
            .with_drain_on_shutdown(true)
            .build_config()
            .expect("valid");
        assert_eq!(config.qos, QoS::ExactlyOnce);
        assert_eq!(config.capacity.get(), 3);
        assert_eq!(config.max_buffered.map(NonZeroUsize::get), Some(6));
        assert_eq!(config.publish_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.warn_interval, Duration::ZERO);
        assert!(config.drain_on_shutdown);
    }
}
