//! Compatibility bridge for the Rust `log` crate.
//!
//! [`MqttLogBridge`] implements `log::Log` and forwards records into an
//! [`MqttHandler`]. Records whose target lies inside this crate or the MQTT
//! transport are refused: those are the handler's own diagnostics, and
//! forwarding them would feed publish failures back into the buffer they
//! came from.

use std::sync::Arc;

use log::{Metadata, Record, SetLoggerError};
use thiserror::Error;

use crate::level::LogLevel;
use crate::log_record::{LogRecord, RecordMetadata};
use crate::mqtt_handler::MqttHandler;

const INTERNAL_TARGETS: &[&str] = &[env!("CARGO_CRATE_NAME"), "rumqttc"];

/// Reasons [`MqttLogBridge::install`] can fail.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The handler only accepts levels the `log` crate cannot produce.
    #[error("handler level {0} is above every `log` level")]
    LevelOutOfRange(LogLevel),
    /// Another global logger is already installed.
    #[error(transparent)]
    SetLogger(#[from] SetLoggerError),
}

/// Adapter implementing the Rust `log::Log` trait for an [`MqttHandler`].
pub struct MqttLogBridge {
    handler: Arc<MqttHandler>,
    excluded: Vec<String>,
}

fn is_within(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

impl MqttLogBridge {
    pub fn new(handler: Arc<MqttHandler>) -> Self {
        Self {
            handler,
            excluded: INTERNAL_TARGETS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Refuse records whose target is `prefix` or one of its submodules.
    pub fn exclude_target(mut self, prefix: impl Into<String>) -> Self {
        self.excluded.push(prefix.into());
        self
    }

    fn is_excluded(&self, target: &str) -> bool {
        self.excluded.iter().any(|prefix| is_within(target, prefix))
    }

    /// Install the bridge as the global `log` logger.
    ///
    /// The global maximum level is set to the handler's minimum level.
    ///
    /// # Errors
    ///
    /// * [`InstallError::LevelOutOfRange`] - the handler's level is
    ///   `CRITICAL`, which no `log` record reaches.
    /// * [`InstallError::SetLogger`] - a global logger is already set.
    pub fn install(self) -> Result<(), InstallError> {
        let level = self.handler.level();
        if level > LogLevel::Error {
            return Err(InstallError::LevelOutOfRange(level));
        }
        let max_level = level.into();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl log::Log for MqttLogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.handler
            .is_enabled_for(LogLevel::from(metadata.level()))
            && !self.is_excluded(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let metadata = RecordMetadata {
            module_path: record.module_path().unwrap_or_default().to_owned(),
            filename: record.file().unwrap_or_default().to_owned(),
            line_number: record.line().unwrap_or(0),
            ..Default::default()
        };
        let converted = LogRecord::with_metadata(
            record.target(),
            LogLevel::from(record.level()),
            &record.args().to_string(),
            metadata,
        );
        self.handler.emit(&converted);
    }

    fn flush(&self) {
        self.handler.flush();
    }
}

impl std::fmt::Debug for MqttLogBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttLogBridge")
            .field("handler", &self.handler)
            .field("excluded", &self.excluded)
            .finish()
    }
}
