//! Core handler trait and errors shared by handler implementations.

use thiserror::Error;

use crate::log_record::LogRecord;

/// Errors surfaced by handler lifecycle operations.
///
/// Record emission never reports these; they only arise when driving the
/// handler's background work.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// A flush loop is already running for this handler.
    #[error("flush loop already running")]
    AlreadyRunning,
    /// No Tokio runtime is available to spawn the flush loop on.
    #[error("no Tokio runtime available")]
    NoRuntime,
}

/// Trait implemented by all log handlers.
///
/// `handle` is called from arbitrary threads and must neither block nor
/// fail: a handler that cannot accept a record drops it and reports the
/// drop through its own diagnostics.
pub trait LogHandler: Send + Sync {
    /// Dispatch a log record for handling.
    fn handle(&self, record: &LogRecord);

    /// Request that buffered records are sent as soon as possible.
    ///
    /// Returns `false` when the handler can no longer flush.
    fn flush(&self) -> bool {
        true
    }
}
