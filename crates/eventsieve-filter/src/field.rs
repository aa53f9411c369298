use tracing::debug;

use eventsieve_types::DisplayRow;

use crate::engine::FilterEngine;
use crate::extract::{EventField, KeyExtractor};
use crate::item::FilterItem;
use crate::registry::FilterRegistry;
use crate::view::{FilterView, Predicate};

/// Filter engine bound to one record field, with single-value drill-down
/// operations on top of the refresh/apply/reset lifecycle.
///
/// The drill-down operations only change selections. An attached predicate
/// sees them at once; call `apply` to have the view re-register it.
#[derive(Debug)]
pub struct FieldFilterEngine<R: ?Sized, X> {
    engine: FilterEngine<R, X>,
}

/// Filter on the provider name of displayed event rows
pub type SourceFilter = FieldFilterEngine<DisplayRow, EventField>;

impl SourceFilter {
    pub fn by_provider() -> Self {
        Self::new(EventField::Provider)
    }
}

impl<R, X> FieldFilterEngine<R, X>
where
    R: ?Sized + 'static,
    X: KeyExtractor<R> + 'static,
{
    pub fn new(extractor: X) -> Self {
        Self {
            engine: FilterEngine::new(extractor),
        }
    }

    /// Select only `name`, deselecting everything else.
    /// Returns false (and changes nothing) if no item has that name.
    pub fn isolate_only(&mut self, name: &str) -> bool {
        let registry = self.engine.registry_mut();
        if registry.find(name).is_none() {
            return false;
        }
        for item in registry.items_mut() {
            let keep = item.name() == name;
            item.set_selected(keep);
        }
        debug!(name, "isolated filter value");
        true
    }

    /// Deselect `name`, leaving the other items alone.
    /// Returns false if no item has that name.
    pub fn exclude(&mut self, name: &str) -> bool {
        let found = self.engine.registry_mut().set_selected(name, false);
        if found {
            debug!(name, "excluded filter value");
        }
        found
    }

    /// Set one item's selection, as a checkbox toggle would
    pub fn set_selected(&mut self, name: &str, selected: bool) -> bool {
        self.engine.registry_mut().set_selected(name, selected)
    }

    pub fn toggle(&mut self, name: &str) -> bool {
        self.engine.registry_mut().toggle(name)
    }

    pub fn refresh<'r, I, V>(&mut self, records: I, view: &mut V)
    where
        I: IntoIterator<Item = &'r R>,
        V: FilterView<R> + ?Sized,
    {
        self.engine.refresh(records, view);
    }

    pub fn apply<V>(&mut self, view: &mut V)
    where
        V: FilterView<R> + ?Sized,
    {
        self.engine.apply(view);
    }

    pub fn reset<V>(&mut self, view: &mut V)
    where
        V: FilterView<R> + ?Sized,
    {
        self.engine.reset(view);
    }

    pub fn clear<V>(&mut self, view: &mut V)
    where
        V: FilterView<R> + ?Sized,
    {
        self.engine.clear(view);
    }

    pub fn is_match(&self, record: &R) -> bool {
        self.engine.is_match(record)
    }

    pub fn predicate(&self) -> Predicate<R> {
        self.engine.predicate()
    }

    pub fn registry(&self) -> &FilterRegistry {
        self.engine.registry()
    }

    pub fn items(&self) -> &[FilterItem] {
        self.engine.items()
    }

    pub fn field(&self) -> &X {
        self.engine.extractor()
    }

    pub fn is_attached(&self) -> bool {
        self.engine.is_attached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{CountingView, rows};
    use crate::item::{FilterItemState, ItemChange};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn filter(providers: &[&str]) -> (SourceFilter, CountingView) {
        let mut view = CountingView::default();
        let mut filter = SourceFilter::by_provider();
        filter.refresh(&rows(providers), &mut view);
        (filter, view)
    }

    fn selection(filter: &SourceFilter) -> Vec<(&str, bool)> {
        filter
            .items()
            .iter()
            .map(|item| (item.name(), item.selected()))
            .collect()
    }

    /// Record `(name, selected)` for every item notification
    fn watch_items(filter: &SourceFilter) -> Rc<RefCell<Vec<(String, bool)>>> {
        let changes = Rc::new(RefCell::new(Vec::new()));
        for item in filter.items() {
            let sink = Rc::clone(&changes);
            item.subscribe(move |change: &ItemChange| {
                sink.borrow_mut().push((change.name.clone(), change.selected));
            });
        }
        changes
    }

    fn owned(changes: &[(&str, bool)]) -> Vec<(String, bool)> {
        changes
            .iter()
            .map(|(name, selected)| (name.to_string(), *selected))
            .collect()
    }

    #[test]
    fn test_isolate_only() {
        let (mut filter, _view) = filter(&["A", "B", "C"]);

        assert!(filter.isolate_only("B"));
        assert_eq!(
            selection(&filter),
            vec![("A", false), ("B", true), ("C", false)]
        );
    }

    #[test]
    fn test_isolate_only_reselects_target() {
        let (mut filter, _view) = filter(&["A", "B"]);
        filter.exclude("B");

        assert!(filter.isolate_only("B"));
        assert_eq!(selection(&filter), vec![("A", false), ("B", true)]);
    }

    #[test]
    fn test_isolate_only_unknown_name() {
        let (mut filter, _view) = filter(&["A", "B", "C"]);
        filter.exclude("C");
        let before: Vec<FilterItemState> = filter.registry().states();

        assert!(!filter.isolate_only("Z"));
        assert_eq!(filter.registry().states(), before);
    }

    #[test]
    fn test_isolate_only_notifies_flipped_items() {
        let (mut filter, _view) = filter(&["A", "B", "C"]);
        let changes = watch_items(&filter);

        filter.isolate_only("B");
        assert_eq!(*changes.borrow(), owned(&[("A", false), ("C", false)]));

        filter.isolate_only("B");
        assert_eq!(changes.borrow().len(), 2);
    }

    #[test]
    fn test_exclude_notifies_once() {
        let (mut filter, _view) = filter(&["A", "B"]);
        let changes = watch_items(&filter);

        filter.exclude("A");
        filter.exclude("A");
        filter.exclude("Z");
        assert_eq!(*changes.borrow(), owned(&[("A", false)]));
    }

    #[test]
    fn test_reset_notifies_deselected_items() {
        let (mut filter, mut view) = filter(&["A", "B", "C"]);
        filter.isolate_only("A");
        let changes = watch_items(&filter);

        filter.reset(&mut view);
        assert_eq!(*changes.borrow(), owned(&[("B", true), ("C", true)]));
    }

    #[test]
    fn test_exclude() {
        let (mut filter, _view) = filter(&["A", "B"]);

        assert!(filter.exclude("A"));
        assert_eq!(selection(&filter), vec![("A", false), ("B", true)]);
        assert!(!filter.exclude("Z"));
        assert_eq!(selection(&filter), vec![("A", false), ("B", true)]);
    }

    #[test]
    fn test_drill_down_does_not_reapply() {
        let (mut filter, view) = filter(&["A", "B"]);
        let registered = view.predicates.len();

        filter.isolate_only("A");
        filter.exclude("B");
        assert_eq!(view.predicates.len(), registered);
        assert_eq!(view.clears, 0);
    }

    #[test]
    fn test_drill_down_is_visible_through_predicate() {
        let (mut filter, view) = filter(&["A", "B"]);
        let [a, b] = <[DisplayRow; 2]>::try_from(rows(&["A", "B"])).unwrap();

        filter.isolate_only("B");
        assert!(!view.accepts(&a));
        assert!(view.accepts(&b));
    }

    #[test]
    fn test_reset_after_toggles() {
        let (mut filter, mut view) = filter(&["A", "B", "C"]);
        filter.isolate_only("A");
        filter.toggle("B");
        filter.set_selected("A", false);

        filter.reset(&mut view);
        assert!(filter.registry().all_selected());
        assert!(!filter.is_attached());
    }

    #[test]
    fn test_refresh_keeps_exclusions() {
        let (mut filter, mut view) = filter(&["A", "B"]);
        filter.exclude("A");

        filter.refresh(&rows(&["A", "B", "C"]), &mut view);
        assert_eq!(
            selection(&filter),
            vec![("A", false), ("B", true), ("C", true)]
        );
    }
}
