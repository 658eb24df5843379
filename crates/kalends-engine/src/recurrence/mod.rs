//! Recurrence expansion of [`crate::model::EventSeries`] into concrete occurrences.

mod expander;

pub use expander::{SCAN_LIMIT_MONTHS, expand};
