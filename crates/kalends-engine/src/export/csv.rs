//! CSV rendering of events.
//!
//! The column set and value formats match what calendar importers expect:
//! dates as `yyyy/MM/dd`, times as `h:mm AM/PM`, booleans as `True`/`False`.

use crate::model::Event;

/// Column headers, in output order.
pub const HEADERS: [&str; 9] = [
    "Subject",
    "Start Date",
    "Start Time",
    "End Date",
    "End Time",
    "All Day Event",
    "Description",
    "Location",
    "Private",
];

const DATE_FORMAT: &str = "%Y/%m/%d";
const TIME_FORMAT: &str = "%-I:%M %p";

/// ## Summary
/// Renders the header row followed by one row per event, in the given order.
///
/// Absent descriptions and locations export as empty fields.
#[must_use]
pub fn to_csv_rows<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<String> {
    let mut rows = vec![HEADERS.join(",")];
    rows.extend(events.into_iter().map(event_row));
    rows
}

/// Renders a complete CSV document with CRLF line endings.
#[must_use]
pub fn to_csv<'a>(events: impl IntoIterator<Item = &'a Event>) -> String {
    let mut document = to_csv_rows(events).join("\r\n");
    document.push_str("\r\n");
    document
}

fn event_row(event: &Event) -> String {
    let fields = [
        escape_field(event.subject()),
        event.start().format(DATE_FORMAT).to_string(),
        event.start().format(TIME_FORMAT).to_string(),
        event.end().format(DATE_FORMAT).to_string(),
        event.end().format(TIME_FORMAT).to_string(),
        bool_field(event.is_all_day()).to_string(),
        escape_field(event.description().unwrap_or_default()),
        escape_field(event.location().unwrap_or_default()),
        bool_field(event.is_private()).to_string(),
    ];
    fields.join(",")
}

fn bool_field(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Quotes a field when it holds a separator, quote or line break (RFC 4180).
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
