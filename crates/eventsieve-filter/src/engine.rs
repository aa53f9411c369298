use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::extract::KeyExtractor;
use crate::item::FilterItem;
use crate::registry::FilterRegistry;
use crate::view::{FilterView, Predicate};

/// Drives a `FilterRegistry` from record batches and keeps a match
/// predicate attached to one external view.
///
/// The engine remembers whether its predicate is attached, so attaching and
/// detaching are idempotent. It assumes every call is made with the same
/// view.
pub struct FilterEngine<R: ?Sized, X> {
    registry: FilterRegistry,
    extractor: Rc<X>,
    attached: bool,
    _record: PhantomData<fn(&R)>,
}

impl<R, X> FilterEngine<R, X>
where
    R: ?Sized + 'static,
    X: KeyExtractor<R> + 'static,
{
    pub fn new(extractor: X) -> Self {
        Self {
            registry: FilterRegistry::new(),
            extractor: Rc::new(extractor),
            attached: false,
            _record: PhantomData,
        }
    }

    /// Rebuild the toggles from a record batch, then re-attach the predicate.
    ///
    /// Registry subscribers hear about added or removed items only after the
    /// new predicate is attached.
    pub fn refresh<'r, I, V>(&mut self, records: I, view: &mut V)
    where
        I: IntoIterator<Item = &'r R>,
        V: FilterView<R> + ?Sized,
    {
        let extractor = &self.extractor;
        let keys = records
            .into_iter()
            .filter_map(|record| extractor.extract_key(record));
        let change = self.registry.reconcile_held(keys);
        self.apply(view);
        if let Some(change) = change {
            self.registry.notify(&change);
        }
    }

    /// Replace the view's predicate with one built from the current items
    pub fn apply<V>(&mut self, view: &mut V)
    where
        V: FilterView<R> + ?Sized,
    {
        self.detach(view);
        self.attach(view);
        debug!(
            items = self.registry.len(),
            selected = self.registry.selected_names().len(),
            "applied filter"
        );
    }

    /// Detach the predicate so the view shows everything, and select every item
    pub fn reset<V>(&mut self, view: &mut V)
    where
        V: FilterView<R> + ?Sized,
    {
        self.detach(view);
        self.registry.reset_all();
        debug!(items = self.registry.len(), "reset filter");
    }

    /// Detach the predicate and drop every item
    pub fn clear<V>(&mut self, view: &mut V)
    where
        V: FilterView<R> + ?Sized,
    {
        self.detach(view);
        self.registry.clear();
    }

    /// Whether a record passes the current selection.
    ///
    /// Records without a key, or whose key has no selected item, are excluded.
    pub fn is_match(&self, record: &R) -> bool {
        self.extractor
            .extract_key(record)
            .and_then(|key| self.registry.find(key))
            .is_some_and(FilterItem::selected)
    }

    /// Build a predicate over the current item list.
    ///
    /// The predicate sees later selection changes but not items added or
    /// removed afterwards; `apply` builds a fresh one.
    pub fn predicate(&self) -> Predicate<R> {
        let matcher = Matcher {
            entries: self
                .registry
                .items()
                .iter()
                .map(|item| (item.name().to_string(), item.selection_flag()))
                .collect(),
            extractor: Rc::clone(&self.extractor),
        };
        Rc::new(move |record: &R| matcher.matches(record))
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn items(&self) -> &[FilterItem] {
        self.registry.items()
    }

    pub fn extractor(&self) -> &X {
        &self.extractor
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn registry_mut(&mut self) -> &mut FilterRegistry {
        &mut self.registry
    }

    fn attach<V>(&mut self, view: &mut V)
    where
        V: FilterView<R> + ?Sized,
    {
        if self.attached {
            return;
        }
        view.set_filter_predicate(self.predicate());
        self.attached = true;
        trace!("attached filter predicate");
    }

    fn detach<V>(&mut self, view: &mut V)
    where
        V: FilterView<R> + ?Sized,
    {
        if !self.attached {
            return;
        }
        view.clear_filter_predicate();
        self.attached = false;
        trace!("detached filter predicate");
    }
}

impl<R: ?Sized, X: fmt::Debug> fmt::Debug for FilterEngine<R, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEngine")
            .field("extractor", &self.extractor)
            .field("registry", &self.registry)
            .field("attached", &self.attached)
            .finish()
    }
}

/// Snapshot of item names with live selection flags, sorted by name
struct Matcher<X> {
    entries: Vec<(String, Rc<Cell<bool>>)>,
    extractor: Rc<X>,
}

impl<X> Matcher<X> {
    fn matches<R>(&self, record: &R) -> bool
    where
        R: ?Sized,
        X: KeyExtractor<R>,
    {
        let Some(key) = self.extractor.extract_key(record) else {
            return false;
        };
        self.entries
            .binary_search_by(|(name, _)| name.as_str().cmp(key))
            .is_ok_and(|idx| self.entries[idx].1.get())
    }
}
