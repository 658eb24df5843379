//! Named calendars, each owning one [`crate::store::EventStore`] in one timezone.
//!
//! Copies between calendars convert wall-clock times from the source zone to
//! the target zone and are committed item by item.

mod copy;
mod registry;
mod timezone;

pub use copy::CopyReport;
pub use registry::{Calendar, CalendarRegistry};
pub use timezone::{convert_between, parse_timezone};
