//! Event processing for eventsieve
//!
//! This crate provides event record parsing, buffering, and the displayed
//! view that filter engines attach to.

mod buffer;
mod parser;
mod view;

pub use buffer::{EventBuffer, LevelCounts};
pub use parser::{ParseError, RecordParser};
pub use view::RecordView;

// Re-export types used in our public API
pub use eventsieve_types::{DisplayRow, EventRecord, LogLevel};
