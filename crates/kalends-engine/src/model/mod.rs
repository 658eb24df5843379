//! Event and recurring-series value types.

mod event;
mod series;

pub use event::{BusinessKey, Event, EventBuilder, EventPatch};
pub use series::{EventSeries, Termination};
