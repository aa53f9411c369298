use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::item::{FilterItem, FilterItemState};
use crate::observe::{SubscriptionId, Subscribers};

/// Structural change to a registry's item list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryChange {
    /// Items were added and/or removed by a reconciliation
    Reconciled {
        added: Vec<String>,
        removed: Vec<String>,
    },
    /// Every item was dropped
    Cleared,
}

/// Ordered, name-keyed set of filter toggles.
///
/// Items are kept sorted by name (byte-wise, case-sensitive) and names are
/// unique and non-empty. Consumers get a read-only slice; only the registry
/// adds or removes items.
#[derive(Debug, Default)]
pub struct FilterRegistry {
    items: Vec<FilterItem>,
    subscribers: Subscribers<RegistryChange>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the item list from the distinct values of a new batch.
    ///
    /// Values already present keep their item (and its selection and
    /// subscribers). New values start selected. Values missing from the
    /// input are dropped. Duplicates and empty strings are ignored.
    pub fn reconcile<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(change) = self.reconcile_held(values) {
            self.notify(&change);
        }
    }

    /// Reconcile without notifying subscribers, returning the structural
    /// change (if any) for the caller to publish once it is ready.
    pub(crate) fn reconcile_held<I, S>(&mut self, values: I) -> Option<RegistryChange>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let incoming: BTreeSet<String> = values
            .into_iter()
            .filter(|v| !v.as_ref().is_empty())
            .map(|v| v.as_ref().to_string())
            .collect();

        let mut previous: HashMap<String, FilterItem> = self
            .items
            .drain(..)
            .map(|item| (item.name().to_string(), item))
            .collect();

        let mut added = Vec::new();
        let mut next = Vec::with_capacity(incoming.len());
        for name in incoming {
            match previous.remove(&name) {
                Some(item) => next.push(item),
                None => {
                    next.push(FilterItem::new(name.clone(), true));
                    added.push(name);
                }
            }
        }

        let mut removed: Vec<String> = previous.into_keys().collect();
        removed.sort();

        self.items = next;

        debug!(
            items = self.items.len(),
            added = added.len(),
            removed = removed.len(),
            "reconciled filter items"
        );

        if added.is_empty() && removed.is_empty() {
            return None;
        }
        Some(RegistryChange::Reconciled { added, removed })
    }

    pub(crate) fn notify(&self, change: &RegistryChange) {
        self.subscribers.emit(change);
    }

    /// Select every item
    pub fn reset_all(&mut self) {
        for item in &mut self.items {
            item.set_selected(true);
        }
    }

    /// Drop every item
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        self.subscribers.emit(&RegistryChange::Cleared);
    }

    pub fn find(&self, name: &str) -> Option<&FilterItem> {
        self.position(name).map(|idx| &self.items[idx])
    }

    /// Set one item's selection. Returns false if no item has that name.
    pub fn set_selected(&mut self, name: &str, selected: bool) -> bool {
        match self.find_mut(name) {
            Some(item) => {
                item.set_selected(selected);
                true
            }
            None => false,
        }
    }

    /// Flip one item's selection. Returns false if no item has that name.
    pub fn toggle(&mut self, name: &str) -> bool {
        match self.find_mut(name) {
            Some(item) => {
                let selected = item.selected();
                item.set_selected(!selected);
                true
            }
            None => false,
        }
    }

    /// Names of all selected items, in order
    pub fn selected_names(&self) -> BTreeSet<&str> {
        self.items
            .iter()
            .filter(|item| item.selected())
            .map(|item| item.name())
            .collect()
    }

    /// Read-only, name-ordered view of the items
    pub fn items(&self) -> &[FilterItem] {
        &self.items
    }

    pub fn states(&self) -> Vec<FilterItemState> {
        self.items.iter().map(FilterItem::state).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when no item is deselected
    pub fn all_selected(&self) -> bool {
        self.items.iter().all(FilterItem::selected)
    }

    /// Listen for items being added or removed
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&RegistryChange) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub(crate) fn items_mut(&mut self) -> impl Iterator<Item = &mut FilterItem> {
        self.items.iter_mut()
    }

    pub(crate) fn find_mut(&mut self, name: &str) -> Option<&mut FilterItem> {
        self.position(name).map(|idx| &mut self.items[idx])
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items
            .binary_search_by(|item| item.name().cmp(name))
            .ok()
    }
}
