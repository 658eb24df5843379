//! In-process calendar engine: events, recurring series, scoped edits and
//! interval queries over a duplicate-free event store.

pub mod calendar;
pub mod error;
pub mod export;
pub mod model;
pub mod recurrence;
pub mod store;

pub use model::{BusinessKey, Event, EventBuilder, EventPatch, EventSeries, Termination};
pub use store::{CreateOutcome, EditOutcome, EventStore};
