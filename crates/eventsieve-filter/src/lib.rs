//! Toggle-based filtering for eventsieve
//!
//! This crate keeps a set of named on/off toggles in step with the distinct
//! values of a record batch, and attaches a match predicate to an external
//! view so records failing the current selection are hidden.

mod engine;
mod extract;
mod field;
mod item;
mod observe;
mod registry;
mod view;

pub use engine::FilterEngine;
pub use extract::{EventField, KeyExtractor};
pub use field::{FieldFilterEngine, SourceFilter};
pub use item::{FilterItem, FilterItemState, ItemChange, ItemField};
pub use observe::{SubscriptionId, Subscribers};
pub use registry::{FilterRegistry, RegistryChange};
pub use view::{FilterView, Predicate};
