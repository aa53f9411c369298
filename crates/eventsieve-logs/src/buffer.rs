use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use eventsieve_types::{EventRecord, LogLevel};

/// Append-only, capacity-bounded store of event records.
///
/// Cloning gives another handle to the same storage.
#[derive(Clone)]
pub struct EventBuffer {
    /// Internal storage
    records: Arc<RwLock<VecDeque<EventRecord>>>,

    /// Maximum capacity
    capacity: usize,

    /// Next record ID
    next_id: Arc<AtomicU64>,
}

impl EventBuffer {
    /// Create a new buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Arc::new(RwLock::new(VecDeque::with_capacity(capacity.min(4096)))),
            capacity: capacity.max(1),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Append a record, evicting the oldest if at capacity
    pub fn push(&self, mut record: EventRecord) {
        record.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.write();
        if records.len() >= self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Append every record from an iterator
    pub fn extend<I>(&self, records: I)
    where
        I: IntoIterator<Item = EventRecord>,
    {
        for record in records {
            self.push(record);
        }
    }

    /// Get all records (cloned)
    pub fn all(&self) -> Vec<EventRecord> {
        self.records.read().iter().cloned().collect()
    }

    /// ID the next pushed record will get
    pub fn next_id(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }

    /// Total record count
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Clear all records
    pub fn clear(&self) {
        self.records.write().clear();
        self.next_id.store(0, Ordering::SeqCst);
    }
}

/// Counts per log level
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub trace: usize,
    pub debug: usize,
    pub info: usize,
    pub warn: usize,
    pub error: usize,
    pub fatal: usize,
    pub unknown: usize,
}

impl LevelCounts {
    pub fn from_levels<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = LogLevel>,
    {
        let mut counts = Self::default();
        for level in levels {
            match level {
                LogLevel::Trace => counts.trace += 1,
                LogLevel::Debug => counts.debug += 1,
                LogLevel::Info => counts.info += 1,
                LogLevel::Warn => counts.warn += 1,
                LogLevel::Error => counts.error += 1,
                LogLevel::Fatal => counts.fatal += 1,
                LogLevel::Unknown => counts.unknown += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.trace + self.debug + self.info + self.warn + self.error + self.fatal + self.unknown
    }
}
