//! Handler builders and associated errors.
//!
//! Builders collect optional settings, validate them on `build`, and hand a
//! resolved configuration to the handler so invalid combinations never reach
//! a running handler.

use thiserror::Error;

pub mod mqtt_builder;

pub use mqtt_builder::MqttHandlerBuilder;

/// Errors that may occur while building a handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
}
