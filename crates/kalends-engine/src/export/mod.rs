//! Export formats for stored events.
//!
//! - CSV: Google Calendar compatible import file

pub mod csv;
