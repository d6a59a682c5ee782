//! MQTT logging handler implementation.
//!
//! [`MqttHandler`] formats records on the caller's thread, appends them to an
//! in-memory buffer, and raises a single-slot flush trigger once the buffer
//! reaches capacity or a record meets the flush level. A separate
//! asynchronous [`FlushLoop`] waits on that trigger, swaps the buffer out,
//! and publishes the batch as one newline-joined payload.
//!
//! # Delivery semantics
//!
//! Delivery is best effort and at most once:
//!
//! - A failed or timed-out publish drops its batch after a rate-limited
//!   warning; the loop keeps running.
//! - Records emitted after [`MqttHandler::stop`] are dropped.
//! - Lines still buffered when the loop stops are counted as dropped and
//!   reported, unless `drain_on_shutdown` publishes them first.

mod buffer;
mod config;
mod handler;
mod stats;
mod trigger;
mod worker;


pub use config::{
    DEFAULT_CAPACITY, DEFAULT_FLUSH_LEVEL, DEFAULT_LEVEL, DEFAULT_PUBLISH_TIMEOUT,
    MqttHandlerConfig,
};
pub use handler::MqttHandler;
pub use stats::HandlerStats;
pub use worker::{FlushLoop, FlushOutcome};
