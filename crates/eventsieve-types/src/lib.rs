//! Shared types for eventsieve
//!
//! This crate contains data structures used across multiple eventsieve crates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// Log Types
// ============================================================================

/// Event severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Fatal,
    Unknown,
}

impl LogLevel {
    /// Parse log level from common formats
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" | "trc" | "verbose" => Self::Trace,
            "debug" | "dbg" => Self::Debug,
            "info" | "inf" | "information" | "informational" => Self::Info,
            "warn" | "warning" | "wrn" => Self::Warn,
            "error" | "err" => Self::Error,
            "fatal" | "critical" | "crit" | "ftl" => Self::Fatal,
            _ => Self::Unknown,
        }
    }

    /// Map a Windows event level number
    pub fn from_event_level(level: u64) -> Self {
        match level {
            0 | 4 => Self::Info,
            1 => Self::Fatal,
            2 => Self::Error,
            3 => Self::Warn,
            5 => Self::Trace,
            _ => Self::Unknown,
        }
    }

    /// Short display string (3 chars)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRC",
            Self::Debug => "DBG",
            Self::Info => "INF",
            Self::Warn => "WRN",
            Self::Error => "ERR",
            Self::Fatal => "FTL",
            Self::Unknown => "???",
        }
    }
}

/// A single event record
#[derive(Clone, Debug, Serialize)]
pub struct EventRecord {
    /// Unique sequential ID, assigned by the buffer
    pub id: u64,

    /// Line number within the source stream
    pub line_number: u64,

    /// Name of the provider (source) that emitted the event
    pub provider: String,

    /// Provider-specific event identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<u32>,

    /// Parsed timestamp (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Severity level
    pub level: LogLevel,

    /// Message text
    pub message: String,

    /// Any other fields found in the source line
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, serde_json::Value>,
}

impl EventRecord {
    /// Create a new record with minimal fields
    pub fn new(provider: impl Into<String>, line_number: u64, message: impl Into<String>) -> Self {
        Self {
            id: 0,
            line_number,
            provider: provider.into(),
            event_id: None,
            timestamp: None,
            level: LogLevel::Unknown,
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    /// Set the level, builder style
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

// ============================================================================
// View Types
// ============================================================================

/// One row of a displayed event list.
///
/// Views are heterogeneous: besides events they may carry marker rows such
/// as the start of a new input file. Markers have no filterable fields.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplayRow {
    Event(EventRecord),
    Marker { label: String },
}

impl DisplayRow {
    pub fn marker(label: impl Into<String>) -> Self {
        Self::Marker {
            label: label.into(),
        }
    }

    /// The event behind this row, if it is one
    pub fn event(&self) -> Option<&EventRecord> {
        match self {
            Self::Event(record) => Some(record),
            Self::Marker { .. } => None,
        }
    }
}

impl From<EventRecord> for DisplayRow {
    fn from(record: EventRecord) -> Self {
        Self::Event(record)
    }
}
