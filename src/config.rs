//! Configuration file support
//!
//! Settings are read from an optional TOML file and then overridden by
//! command-line flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use eventsieve_filter::EventField;

/// Default capacity of the event buffer
pub const DEFAULT_BUFFER_SIZE: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of events kept in memory
    pub buffer_size: usize,

    /// Record field to filter on ("provider" or "level")
    pub field: String,

    /// Show only this value after loading
    pub only: Option<String>,

    /// Hide these values after loading
    pub exclude: Vec<String>,

    /// Extra tracing directive, e.g. "eventsieve_filter=debug"
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            field: EventField::default().as_str().to_string(),
            only: None,
            exclude: Vec::new(),
            log_level: None,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Default)]
pub struct Overrides {
    pub buffer_size: Option<usize>,
    pub field: Option<String>,
    pub only: Option<String>,
    pub exclude: Vec<String>,
}

impl Config {
    /// Load the config file, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line values. A non-empty exclude list replaces the file's.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(buffer_size) = overrides.buffer_size {
            self.buffer_size = buffer_size;
        }
        if let Some(field) = overrides.field {
            self.field = field;
        }
        if overrides.only.is_some() {
            self.only = overrides.only;
        }
        if !overrides.exclude.is_empty() {
            self.exclude = overrides.exclude;
        }
        self
    }

    pub fn event_field(&self) -> Result<EventField> {
        EventField::from_str(&self.field).ok_or_else(|| {
            anyhow!(
                "Unknown filter field '{}' (expected 'provider' or 'level')",
                self.field
            )
        })
    }
}
