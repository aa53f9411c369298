use std::cell::{Cell, RefCell};
use std::fmt;

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// Listener list for change notifications.
///
/// Single-threaded. Subscribing takes `&self` so observers can attach through
/// read-only views of the owning value. Listeners may subscribe or unsubscribe
/// while an event is being dispatched; new listeners first hear the next event.
pub struct Subscribers<E> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, Listener<E>)>>,
    dispatching: Cell<bool>,
    /// Listeners checked out for the dispatch in progress
    in_flight: RefCell<Vec<SubscriptionId>>,
    /// Unsubscribed while checked out
    removed: RefCell<Vec<SubscriptionId>>,
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
            dispatching: Cell::new(false),
            in_flight: RefCell::new(Vec::new()),
            removed: RefCell::new(Vec::new()),
        }
    }

    /// Register a listener
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        if listeners.len() < before {
            return true;
        }
        drop(listeners);

        if self.in_flight.borrow().contains(&id) {
            let mut removed = self.removed.borrow_mut();
            if !removed.contains(&id) {
                removed.push(id);
                return true;
            }
        }
        false
    }

    /// Deliver an event to every listener
    pub fn emit(&self, event: &E) {
        // Nested emits from inside a listener are dropped
        if self.dispatching.replace(true) {
            return;
        }

        let mut active = self.listeners.take();
        *self.in_flight.borrow_mut() = active.iter().map(|(id, _)| *id).collect();
        for (id, listener) in active.iter_mut() {
            if self.removed.borrow().contains(id) {
                continue;
            }
            listener(event);
        }

        self.in_flight.borrow_mut().clear();
        let removed = self.removed.take();
        active.retain(|(id, _)| !removed.contains(id));
        let mut listeners = self.listeners.borrow_mut();
        active.append(&mut listeners);
        *listeners = active;
        self.dispatching.set(false);
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let subs: Subscribers<u32> = Subscribers::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = Rc::clone(&seen);
        subs.subscribe(move |e| a.borrow_mut().push(("a", *e)));
        let b = Rc::clone(&seen);
        subs.subscribe(move |e| b.borrow_mut().push(("b", *e)));

        subs.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let subs: Subscribers<u32> = Subscribers::new();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let id = subs.subscribe(move |_| c.set(c.get() + 1));

        subs.emit(&1);
        assert!(subs.unsubscribe(id));
        assert!(!subs.unsubscribe(id));
        subs.emit(&2);
        assert_eq!(count.get(), 1);
        assert!(subs.is_empty());
    }

    #[test]
    fn test_unsubscribe_during_dispatch() {
        let subs: Rc<Subscribers<u32>> = Rc::new(Subscribers::new());
        let count = Rc::new(Cell::new(0));
        let id_slot: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));

        let inner = Rc::downgrade(&subs);
        let slot = Rc::clone(&id_slot);
        let c = Rc::clone(&count);
        let id = subs.subscribe(move |_| {
            c.set(c.get() + 1);
            if let (Some(subs), Some(id)) = (inner.upgrade(), slot.get()) {
                assert!(subs.unsubscribe(id));
            }
        });
        id_slot.set(Some(id));

        subs.emit(&1);
        subs.emit(&2);
        assert_eq!(count.get(), 1);
        assert!(subs.is_empty());
    }

    #[test]
    fn test_subscribe_during_dispatch() {
        let subs: Rc<Subscribers<u32>> = Rc::new(Subscribers::new());
        let late = Rc::new(Cell::new(0));

        let inner = Rc::downgrade(&subs);
        let late_count = Rc::clone(&late);
        subs.subscribe(move |_| {
            if let Some(subs) = inner.upgrade() {
                let c = Rc::clone(&late_count);
                subs.subscribe(move |_| c.set(c.get() + 1));
            }
        });

        subs.emit(&1);
        assert_eq!(late.get(), 0);
        assert_eq!(subs.len(), 2);
    }
}
