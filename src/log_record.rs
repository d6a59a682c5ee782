//! Log record representation consumed by the MQTT handler.
//!
//! A [`LogRecord`] carries a severity and a message plus contextual metadata
//! such as the timestamp, source location, and originating thread. The
//! handler only ever reads the formatted line and the level; the metadata is
//! there for formatters.

use crate::level::LogLevel;
use std::collections::BTreeMap;
use std::fmt;
use std::thread::{self, ThreadId};
use std::time::SystemTime;

/// Additional context associated with a log record.
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    /// Rust module path where the log call originated.
    pub module_path: String,
    /// Source file name for the log call.
    pub filename: String,
    /// Line number in the source file.
    pub line_number: u32,
    /// Time the record was created.
    pub timestamp: SystemTime,
    /// ID of the thread that created the record.
    pub thread_id: ThreadId,
    /// Name of the thread that created the record (if any).
    pub thread_name: Option<String>,
    /// Structured key-value pairs attached to the record.
    pub key_values: BTreeMap<String, String>,
}

impl RecordMetadata {
    fn capture_runtime() -> (SystemTime, ThreadId, Option<String>) {
        let current = thread::current();
        (
            SystemTime::now(),
            current.id(),
            current.name().map(ToString::to_string),
        )
    }
}

impl Default for RecordMetadata {
    fn default() -> Self {
        let (timestamp, thread_id, thread_name) = Self::capture_runtime();
        Self {
            module_path: String::new(),
            filename: String::new(),
            line_number: 0,
            timestamp,
            thread_id,
            thread_name,
            key_values: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogRecord {
    logger: String,
    level: LogLevel,
    message: String,
    metadata: RecordMetadata,
}

impl LogRecord {
    /// Construct a record from logger `name`, `level`, and `message`.
    pub fn new(logger: &str, level: LogLevel, message: &str) -> Self {
        Self::with_metadata(logger, level, message, RecordMetadata::default())
    }

    /// Construct a record with explicit source location and key-values.
    ///
    /// Timestamp and thread information are always captured afresh.
    pub fn with_metadata(
        logger: &str,
        level: LogLevel,
        message: &str,
        mut metadata: RecordMetadata,
    ) -> Self {
        let (timestamp, thread_id, thread_name) = RecordMetadata::capture_runtime();
        metadata.timestamp = timestamp;
        metadata.thread_id = thread_id;
        metadata.thread_name = thread_name;
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata,
        }
    }

    /// Attach a structured key-value pair.
    pub fn with_key_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.key_values.insert(key.into(), value.into());
        self
    }

    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }
}

/// Unformatted rendering used when a formatter fails.
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_level_and_message() {
        let record = LogRecord::new("app", LogLevel::Warn, "disk low");
        assert_eq!(record.to_string(), "WARN - disk low");
    }

    #[test]
    fn with_metadata_refreshes_runtime_fields() {
        let metadata = RecordMetadata {
            module_path: "app::db".into(),
            line_number: 42,
            ..Default::default()
        };
        let record = LogRecord::with_metadata("app", LogLevel::Info, "ready", metadata)
            .with_key_value("conn", "7");
        assert_eq!(record.metadata().module_path, "app::db");
        assert_eq!(record.metadata().line_number, 42);
        assert_eq!(record.metadata().thread_id, thread::current().id());
        assert_eq!(
            record.metadata().key_values.get("conn").map(String::as_str),
            Some("7")
        );
    }
}
