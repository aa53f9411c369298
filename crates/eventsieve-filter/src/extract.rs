use eventsieve_types::{DisplayRow, EventRecord};

/// Pulls the filter key out of a record.
///
/// `None` means the record does not have the expected shape; such records
/// never pass the filter.
pub trait KeyExtractor<R: ?Sized> {
    fn extract_key<'a>(&self, record: &'a R) -> Option<&'a str>;
}

impl<R: ?Sized, F> KeyExtractor<R> for F
where
    F: for<'a> Fn(&'a R) -> Option<&'a str>,
{
    fn extract_key<'a>(&self, record: &'a R) -> Option<&'a str> {
        self(record)
    }
}

/// Built-in filterable fields of an event record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EventField {
    /// Provider (source) name
    #[default]
    Provider,
    /// Severity level, as its short label
    Level,
}

impl EventField {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "provider" | "source" => Some(Self::Provider),
            "level" | "severity" => Some(Self::Level),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Level => "level",
        }
    }
}

impl KeyExtractor<EventRecord> for EventField {
    fn extract_key<'a>(&self, record: &'a EventRecord) -> Option<&'a str> {
        match self {
            Self::Provider => Some(record.provider.as_str()),
            Self::Level => Some(record.level.as_str()),
        }
    }
}

impl KeyExtractor<DisplayRow> for EventField {
    fn extract_key<'a>(&self, row: &'a DisplayRow) -> Option<&'a str> {
        row.event().and_then(|record| self.extract_key(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventsieve_types::LogLevel;

    fn first_word(line: &str) -> Option<&str> {
        line.split_whitespace().next()
    }

    #[test]
    fn test_event_field_keys() {
        let record = EventRecord::new("Disk", 1, "bad block").with_level(LogLevel::Error);
        assert_eq!(EventField::Provider.extract_key(&record), Some("Disk"));
        assert_eq!(EventField::Level.extract_key(&record), Some("ERR"));
    }

    #[test]
    fn test_marker_rows_have_no_key() {
        let row = DisplayRow::marker("system.jsonl");
        assert_eq!(EventField::Provider.extract_key(&row), None);

        let row = DisplayRow::from(EventRecord::new("Disk", 1, "ok"));
        assert_eq!(EventField::Provider.extract_key(&row), Some("Disk"));
    }

    #[test]
    fn test_fn_extractor() {
        assert_eq!(first_word.extract_key("Disk failed"), Some("Disk"));
        assert_eq!(first_word.extract_key("   "), None);
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!(EventField::from_str("Provider"), Some(EventField::Provider));
        assert_eq!(EventField::from_str("level"), Some(EventField::Level));
        assert_eq!(EventField::from_str("message"), None);
    }
}
