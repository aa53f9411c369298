use std::collections::HashMap;
use std::io::BufRead;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use eventsieve_types::{EventRecord, LogLevel};

const PROVIDER_FIELDS: &[&str] = &["provider", "ProviderName", "source", "Source"];
const LEVEL_FIELDS: &[&str] = &["level", "Level", "severity", "LevelDisplayName"];
const TIME_FIELDS: &[&str] = &["timestamp", "time", "TimeCreated"];
const MESSAGE_FIELDS: &[&str] = &["message", "msg", "Message"];
const EVENT_ID_FIELDS: &[&str] = &["id", "EventId", "Id"];

/// Errors from parsing a single input line
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: invalid JSON: {source}")]
    InvalidJson {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: expected a JSON object")]
    NotAnObject { line: u64 },

    #[error("line {line}: no provider field")]
    MissingProvider { line: u64 },
}

/// Parser for JSON-lines event exports
pub struct RecordParser;

impl RecordParser {
    /// Parse one JSON object into an event record
    pub fn parse_line(raw: &str, line_number: u64) -> Result<EventRecord, ParseError> {
        let value: Value =
            serde_json::from_str(raw.trim()).map_err(|source| ParseError::InvalidJson {
                line: line_number,
                source,
            })?;
        let Value::Object(map) = value else {
            return Err(ParseError::NotAnObject { line: line_number });
        };
        let mut fields: HashMap<String, Value> = map.into_iter().collect();

        let provider = take_string(&mut fields, PROVIDER_FIELDS)
            .filter(|p| !p.is_empty())
            .ok_or(ParseError::MissingProvider { line: line_number })?;
        let message = take_string(&mut fields, MESSAGE_FIELDS).unwrap_or_default();

        let mut record = EventRecord::new(provider, line_number, message);
        record.level = take_level(&mut fields);
        record.timestamp = take_timestamp(&mut fields);
        record.event_id = take_event_id(&mut fields);
        record.fields = fields;
        Ok(record)
    }

    /// Parse every non-blank line of a reader.
    ///
    /// Lines that fail to parse are logged and skipped. I/O errors stop the read.
    pub fn read_all<B: BufRead>(reader: B) -> std::io::Result<Vec<EventRecord>> {
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match Self::parse_line(&line, idx as u64 + 1) {
                Ok(record) => records.push(record),
                Err(e) => warn!("skipping input: {}", e),
            }
        }
        Ok(records)
    }
}

/// Take the first alias present with a non-null value
fn take_field(fields: &mut HashMap<String, Value>, names: &[&str]) -> Option<Value> {
    names
        .iter()
        .find_map(|name| fields.remove(*name).filter(|value| !value.is_null()))
}

fn take_string(fields: &mut HashMap<String, Value>, names: &[&str]) -> Option<String> {
    match take_field(fields, names)? {
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn take_level(fields: &mut HashMap<String, Value>) -> LogLevel {
    match take_field(fields, LEVEL_FIELDS) {
        Some(Value::String(s)) => LogLevel::from_str(&s),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(LogLevel::from_event_level)
            .unwrap_or(LogLevel::Unknown),
        _ => LogLevel::Unknown,
    }
}

fn take_timestamp(fields: &mut HashMap<String, Value>) -> Option<DateTime<Utc>> {
    let Value::String(s) = take_field(fields, TIME_FIELDS)? else {
        return None;
    };
    DateTime::parse_from_rfc3339(&s)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn take_event_id(fields: &mut HashMap<String, Value>) -> Option<u32> {
    match take_field(fields, EVENT_ID_FIELDS)? {
        Value::Number(n) => n.as_u64().and_then(|id| u32::try_from(id).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
