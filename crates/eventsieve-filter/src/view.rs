use std::rc::Rc;

/// Visibility test registered with a view
pub type Predicate<R> = Rc<dyn Fn(&R) -> bool>;

/// Capability a displayed collection exposes so a filter engine can attach
/// and detach its match predicate.
///
/// The view owns its rows and re-evaluates visibility whenever a predicate
/// is set or cleared.
pub trait FilterView<R: ?Sized> {
    fn set_filter_predicate(&mut self, predicate: Predicate<R>);

    fn clear_filter_predicate(&mut self);
}
