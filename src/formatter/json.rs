//! JSON line formatter.
//!
//! Borrows from the record so serialisation allocates only the output
//! string. Timestamps are rendered as RFC 3339 in UTC.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::RecordFormatter;
use crate::log_record::LogRecord;

#[derive(Serialize)]
struct JsonRecord<'a> {
    name: &'a str,
    levelname: &'static str,
    msg: &'a str,
    created: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    module: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    filename: &'a str,
    lineno: u32,
    #[serde(rename = "threadName", skip_serializing_if = "Option::is_none")]
    thread_name: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    extra: &'a BTreeMap<String, String>,
}

impl<'a> From<&'a LogRecord> for JsonRecord<'a> {
    fn from(record: &'a LogRecord) -> Self {
        let metadata = record.metadata();
        let created = DateTime::<Utc>::from(metadata.timestamp)
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        Self {
            name: record.logger(),
            levelname: record.level().as_str(),
            msg: record.message(),
            created,
            module: &metadata.module_path,
            filename: &metadata.filename,
            lineno: metadata.line_number,
            thread_name: metadata.thread_name.as_deref(),
            extra: &metadata.key_values,
        }
    }
}

/// Renders each record as a single-line JSON object.
#[derive(Copy, Clone, Debug, Default)]
pub struct JsonFormatter;

impl RecordFormatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> String {
        match serde_json::to_string(&JsonRecord::from(record)) {
            Ok(line) => line,
            Err(err) => {
                log::warn!("JsonFormatter serialisation error: {err}");
                record.to_string()
            }
        }
    }
}
