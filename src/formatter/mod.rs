//! Formatter implementations used to render records into buffered lines.
//!
//! Provides the core [`RecordFormatter`] trait alongside a shared trait-object
//! wrapper so a single formatter can be handed to several handlers. The MQTT
//! handler formats at emit time, so formatters run on the caller's thread and
//! must be `Send + Sync`.

use std::{fmt, sync::Arc};

use crate::log_record::LogRecord;

mod json;

pub use json::JsonFormatter;

/// Trait for formatting log records into single lines of text.
pub trait RecordFormatter: Send + Sync {
    /// Format a log record into a string representation.
    fn format(&self, record: &LogRecord) -> String;
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn RecordFormatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: RecordFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Wrap an existing shared formatter trait object.
    pub fn from_arc(inner: Arc<dyn RecordFormatter>) -> Self {
        Self { inner }
    }

    /// Format a log record using the wrapped formatter instance.
    pub fn format(&self, record: &LogRecord) -> String {
        self.inner.format(record)
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(MessageFormatter)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn RecordFormatter>)")
    }
}

/// Renders only the record message.
///
/// This is the handler default: a batch payload is then just the messages
/// joined by newlines.
#[derive(Copy, Clone, Debug, Default)]
pub struct MessageFormatter;

impl RecordFormatter for MessageFormatter {
    fn format(&self, record: &LogRecord) -> String {
        record.message().to_owned()
    }
}

/// Renders `"<logger> [<LEVEL>] <message>"`.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFormatter;

impl RecordFormatter for DefaultFormatter {
    fn format(&self, record: &LogRecord) -> String {
        format!(
            "{} [{}] {}",
            record.logger(),
            record.level(),
            record.message()
        )
    }
}

impl<F> RecordFormatter for F
where
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    fn format(&self, record: &LogRecord) -> String {
        self(record)
    }
}
