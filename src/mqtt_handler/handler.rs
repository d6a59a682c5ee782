//! Public handler type exported by the crate.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use tokio::task::JoinHandle;

use crate::{
    formatter::SharedFormatter,
    handler::{HandlerError, LogHandler},
    handlers::{HandlerBuildError, MqttHandlerBuilder},
    level::LogLevel,
    log_record::LogRecord,
    publisher::{Publisher, QoS},
    rate_limited_warner::RateLimitedWarner,
};

use super::{
    buffer::LineBuffer,
    config::MqttHandlerConfig,
    stats::{HandlerStats, Stats},
    trigger::Signal,
    worker::FlushLoop,
};

/// State shared between the emitting side and the flush loop.
pub(crate) struct Shared {
    pub(crate) config: MqttHandlerConfig,
    pub(crate) formatter: SharedFormatter,
    pub(crate) publisher: Arc<dyn Publisher>,
    pub(crate) buffer: LineBuffer,
    pub(crate) trigger: Signal,
    pub(crate) shutdown: Signal,
    pub(crate) running: AtomicBool,
    pub(crate) stats: Stats,
    pub(crate) warner: RateLimitedWarner,
    pub(crate) format_warner: RateLimitedWarner,
}

impl Shared {
    pub(crate) fn warn_dropped(&self) {
        let topic = &self.config.topic;
        self.warner.warn_if_due(|count| {
            warn!("MqttHandler dropped {count} lines for topic '{topic}'");
        });
    }

    pub(crate) fn report_pending_drops(&self) {
        let topic = &self.config.topic;
        self.warner.flush(|count| {
            warn!("MqttHandler dropped {count} lines for topic '{topic}'");
        });
        self.format_warner.flush(|count| {
            warn!("MqttHandler formatter for topic '{topic}' panicked on {count} records");
        });
    }
}

/// Handler buffering formatted records and publishing them to an MQTT topic.
///
/// Emission is synchronous and never blocks or fails. Publishing happens in a
/// [`FlushLoop`] that the application drives with [`run`](Self::run) or
/// [`spawn`](Self::spawn). Dropping the handler stops the loop.
pub struct MqttHandler {
    shared: Arc<Shared>,
}

impl MqttHandler {
    /// Create a handler for `topic` with default settings.
    ///
    /// Use [`MqttHandlerBuilder`] to change the levels, capacity, or QoS.
    pub fn new(
        publisher: Arc<dyn Publisher>,
        topic: impl Into<String>,
    ) -> Result<Self, HandlerBuildError> {
        MqttHandlerBuilder::new(topic).build(publisher)
    }

    pub(crate) fn from_parts(
        config: MqttHandlerConfig,
        formatter: SharedFormatter,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        let warner = RateLimitedWarner::new(config.warn_interval);
        let format_warner = RateLimitedWarner::new(config.warn_interval);
        let buffer = LineBuffer::new(config.max_buffered);
        Self {
            shared: Arc::new(Shared {
                config,
                formatter,
                publisher,
                buffer,
                trigger: Signal::default(),
                shutdown: Signal::default(),
                running: AtomicBool::new(false),
                stats: Stats::default(),
                warner,
                format_warner,
            }),
        }
    }

    /// Buffer `record` and raise the flush trigger when due.
    ///
    /// The record is assumed to have passed the dispatcher's level filter
    /// (see [`is_enabled_for`](Self::is_enabled_for)). A flush is due once
    /// the buffer holds `capacity` lines or the record is at or above the
    /// flush level.
    pub fn emit(&self, record: &LogRecord) {
        let shared = &self.shared;
        if shared.shutdown.is_set() {
            shared.stats.record_dropped(1);
            shared.warner.record_drop();
            shared.warn_dropped();
            return;
        }

        let line = self.format(record);
        let appended = shared.buffer.push(line);
        if appended.evicted {
            debug!("MqttHandler buffer ceiling reached; evicted oldest line");
            shared.stats.record_evicted();
            shared.warner.record_drop();
            shared.warn_dropped();
        }

        if appended.len >= shared.config.capacity.get() || record.level() >= shared.config.flush_level
        {
            shared.trigger.set();
        }
    }

    /// Format with the configured formatter, substituting the record's
    /// unformatted rendering if the formatter panics.
    ///
    /// Panics are reported at most once per warn interval.
    fn format(&self, record: &LogRecord) -> String {
        let shared = &self.shared;
        match panic::catch_unwind(AssertUnwindSafe(|| shared.formatter.format(record))) {
            Ok(line) => line,
            Err(_) => {
                shared.format_warner.record_drop();
                let topic = &shared.config.topic;
                shared.format_warner.warn_if_due(|count| {
                    warn!(
                        "MqttHandler formatter for topic '{topic}' panicked on {count} records; \
                         using unformatted rendering"
                    );
                });
                record.to_string()
            }
        }
    }

    /// Whether a dispatcher should pass records at `level` to this handler.
    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level >= self.shared.config.level
    }

    /// Ask the flush loop to publish whatever is buffered.
    ///
    /// Returns `false` once the handler has been stopped.
    pub fn flush(&self) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.shared.trigger.set();
        true
    }

    /// Claim the handler's flush loop.
    ///
    /// # Errors
    ///
    /// * [`HandlerError::AlreadyRunning`] - another loop has been claimed and
    ///   not yet dropped.
    pub fn flush_loop(&self) -> Result<FlushLoop, HandlerError> {
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return Err(HandlerError::AlreadyRunning);
        }
        Ok(FlushLoop::new(Arc::clone(&self.shared)))
    }

    /// Run the flush loop until [`stop`](Self::stop) is called.
    ///
    /// The returned future is cancel safe with respect to buffered lines,
    /// though a batch that is mid-publish when cancelled is lost.
    ///
    /// # Errors
    ///
    /// * [`HandlerError::AlreadyRunning`] - a loop is already running.
    pub async fn run(&self) -> Result<(), HandlerError> {
        self.flush_loop()?.run().await;
        Ok(())
    }

    /// Spawn the flush loop onto the current Tokio runtime.
    ///
    /// The runtime must have its time driver enabled when a publish timeout
    /// is configured.
    ///
    /// # Errors
    ///
    /// * [`HandlerError::NoRuntime`] - called outside a Tokio runtime.
    /// * [`HandlerError::AlreadyRunning`] - a loop is already running.
    pub fn spawn(&self) -> Result<JoinHandle<()>, HandlerError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| HandlerError::NoRuntime)?;
        let flush_loop = self.flush_loop()?;
        Ok(runtime.spawn(flush_loop.run()))
    }

    /// Signal the flush loop to exit at its next safe point.
    ///
    /// An in-flight publish is allowed to complete. Records emitted afterwards
    /// are dropped.
    pub fn stop(&self) {
        if !self.shared.shutdown.is_set() {
            debug!(
                "MqttHandler stopping for topic '{}'",
                self.shared.config.topic
            );
        }
        self.shared.shutdown.set();
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.shutdown.is_set()
    }

    /// Whether a flush has been requested and not yet started.
    pub fn is_flush_pending(&self) -> bool {
        self.shared.trigger.is_set()
    }

    /// Number of lines waiting to be published.
    pub fn pending(&self) -> usize {
        self.shared.buffer.len()
    }

    pub fn stats(&self) -> HandlerStats {
        self.shared.stats.snapshot()
    }

    pub fn config(&self) -> &MqttHandlerConfig {
        &self.shared.config
    }

    pub fn topic(&self) -> &str {
        &self.shared.config.topic
    }

    pub fn qos(&self) -> QoS {
        self.shared.config.qos
    }

    pub fn level(&self) -> LogLevel {
        self.shared.config.level
    }

    pub fn flush_level(&self) -> LogLevel {
        self.shared.config.flush_level
    }
}

impl LogHandler for MqttHandler {
    fn handle(&self, record: &LogRecord) {
        self.emit(record);
    }

    fn flush(&self) -> bool {
        MqttHandler::flush(self)
    }
}

impl Drop for MqttHandler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for MqttHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttHandler")
            .field("topic", &self.shared.config.topic)
            .field("qos", &self.shared.config.qos)
            .field("pending", &self.pending())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
