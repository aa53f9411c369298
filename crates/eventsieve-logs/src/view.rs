use eventsieve_filter::{FilterView, Predicate};

/// Displayed collection of rows with an optional filter predicate.
///
/// Rows are never removed by filtering; `visible` evaluates the predicate
/// on each call, so selection changes show up immediately.
pub struct RecordView<T> {
    rows: Vec<T>,
    predicate: Option<Predicate<T>>,
}

impl<T> RecordView<T> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            predicate: None,
        }
    }

    pub fn push(&mut self, row: T) {
        self.rows.push(row);
    }

    /// All rows, filtered or not
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Rows accepted by the current predicate (all rows when none is set)
    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().filter(|row| self.accepts(row))
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    pub fn accepts(&self, row: &T) -> bool {
        self.predicate.as_ref().is_none_or(|predicate| predicate(row))
    }

    pub fn has_filter(&self) -> bool {
        self.predicate.is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> Default for RecordView<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for RecordView<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl<T> FilterView<T> for RecordView<T> {
    fn set_filter_predicate(&mut self, predicate: Predicate<T>) {
        self.predicate = Some(predicate);
    }

    fn clear_filter_predicate(&mut self) {
        self.predicate = None;
    }
}
