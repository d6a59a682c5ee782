//! INI configuration for MQTT handlers.
//!
//! A section describes one handler:
//!
//! ```ini
//! [handler_mqtt]
//! topic = plant/line-3/logs
//! qos = 1
//! level = INFO
//! flush_level = ERROR
//! capacity = 50
//! max_buffered = 1000
//! publish_timeout_ms = 5000
//! drain_on_shutdown = true
//! format = json
//! ```
//!
//! Only `topic` is required. Values are parsed here; cross-field rules such
//! as `flush_level >= level` are enforced when the returned builder builds.

use std::fs;
use std::io;
use std::path::Path;

use ini::{Ini, Properties};
use thiserror::Error;

use crate::formatter::{DefaultFormatter, JsonFormatter, MessageFormatter};
use crate::handlers::MqttHandlerBuilder;
use crate::level::LogLevel;
use crate::publisher::QoS;

const KNOWN_KEYS: &[&str] = &[
    "topic",
    "qos",
    "level",
    "flush_level",
    "capacity",
    "max_buffered",
    "publish_timeout_ms",
    "drain_on_shutdown",
    "format",
];

/// Errors raised while loading handler configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("configuration is invalid: {0}")]
    Parse(String),
    #[error("section [{0}] not found")]
    MissingSection(String),
    #[error("section [{section}] is missing required key '{key}'")]
    MissingKey { section: String, key: &'static str },
    #[error("section [{section}] has unknown key '{key}'")]
    UnknownKey { section: String, key: String },
    #[error("invalid value {value:?} for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Read `path` and build a handler builder from `section`.
pub fn builder_from_ini_file(
    path: impl AsRef<Path>,
    section: &str,
) -> Result<MqttHandlerBuilder, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    builder_from_ini_str(&text, section)
}

/// Parse INI `text` and build a handler builder from `section`.
pub fn builder_from_ini_str(text: &str, section: &str) -> Result<MqttHandlerBuilder, ConfigError> {
    let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
    let props = ini
        .section(Some(section))
        .ok_or_else(|| ConfigError::MissingSection(section.to_owned()))?;
    reject_unknown_keys(section, props)?;
    apply_section(section, props)
}

fn reject_unknown_keys(section: &str, props: &Properties) -> Result<(), ConfigError> {
    match props.iter().find(|(key, _)| !KNOWN_KEYS.contains(key)) {
        Some((key, _)) => Err(ConfigError::UnknownKey {
            section: section.to_owned(),
            key: key.to_string(),
        }),
        None => Ok(()),
    }
}

fn apply_section(section: &str, props: &Properties) -> Result<MqttHandlerBuilder, ConfigError> {
    let topic = props.get("topic").ok_or_else(|| ConfigError::MissingKey {
        section: section.to_owned(),
        key: "topic",
    })?;
    let mut builder = MqttHandlerBuilder::new(topic.trim());

    if let Some(raw) = props.get("qos") {
        let level: u8 = parse_value("qos", raw)?;
        let qos = QoS::try_from(level).map_err(|err| invalid("qos", raw, err))?;
        builder = builder.with_qos(qos);
    }
    if let Some(raw) = props.get("level") {
        builder = builder.with_level(parse_level("level", raw)?);
    }
    if let Some(raw) = props.get("flush_level") {
        builder = builder.with_flush_level(parse_level("flush_level", raw)?);
    }
    if let Some(raw) = props.get("capacity") {
        builder = builder.with_capacity(parse_value("capacity", raw)?);
    }
    if let Some(raw) = props.get("max_buffered") {
        builder = builder.with_max_buffered(parse_value("max_buffered", raw)?);
    }
    if let Some(raw) = props.get("publish_timeout_ms") {
        builder = match raw.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => builder.without_publish_timeout(),
            _ => builder.with_publish_timeout_ms(parse_value("publish_timeout_ms", raw)?),
        };
    }
    if let Some(raw) = props.get("drain_on_shutdown") {
        builder = builder.with_drain_on_shutdown(parse_bool("drain_on_shutdown", raw)?);
    }
    if let Some(raw) = props.get("format") {
        builder = match raw.trim().to_ascii_lowercase().as_str() {
            "message" => builder.with_formatter(MessageFormatter),
            "default" => builder.with_formatter(DefaultFormatter),
            "json" => builder.with_formatter(JsonFormatter),
            _ => {
                return Err(invalid(
                    "format",
                    raw,
                    "expected one of: message, default, json",
                ));
            }
        };
    }
    Ok(builder)
}

fn invalid(key: &str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
        reason: reason.to_string(),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: ToString,
{
    raw.trim().parse().map_err(|err| invalid(key, raw, err))
}

fn parse_level(key: &str, raw: &str) -> Result<LogLevel, ConfigError> {
    parse_value(key, raw)
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw, "expected a boolean")),
    }
}
