use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;

use crate::observe::{SubscriptionId, Subscribers};

/// Which property of a `FilterItem` changed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemField {
    Name,
    Selected,
}

/// Notification sent to item subscribers after a change
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemChange {
    /// Item name after the change
    pub name: String,
    pub field: ItemField,
    /// Selection state after the change
    pub selected: bool,
}

/// Plain copy of an item's state
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilterItemState {
    pub name: String,
    pub selected: bool,
}

/// A named on/off toggle for one filterable value
pub struct FilterItem {
    name: String,

    /// Shared with attached predicates so toggles are visible without re-attaching
    selected: Rc<Cell<bool>>,

    subscribers: Subscribers<ItemChange>,
}

impl FilterItem {
    pub fn new(name: impl Into<String>, selected: bool) -> Self {
        Self {
            name: name.into(),
            selected: Rc::new(Cell::new(selected)),
            subscribers: Subscribers::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the item. Uniqueness is the owning registry's concern.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name == self.name {
            return;
        }
        self.name = name;
        self.notify(ItemField::Name);
    }

    pub fn selected(&self) -> bool {
        self.selected.get()
    }

    /// Set the selection state, returning true if it changed
    pub fn set_selected(&mut self, selected: bool) -> bool {
        if self.selected.replace(selected) == selected {
            return false;
        }
        self.notify(ItemField::Selected);
        true
    }

    /// Listen for changes to this item
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ItemChange) + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn state(&self) -> FilterItemState {
        FilterItemState {
            name: self.name.clone(),
            selected: self.selected(),
        }
    }

    pub(crate) fn selection_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.selected)
    }

    fn notify(&self, field: ItemField) {
        self.subscribers.emit(&ItemChange {
            name: self.name.clone(),
            field,
            selected: self.selected(),
        });
    }
}

impl std::fmt::Debug for FilterItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterItem")
            .field("name", &self.name)
            .field("selected", &self.selected())
            .finish()
    }
}
