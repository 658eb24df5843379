//! Read-side queries over an [`EventStore`].
//!
//! Results borrow from the store and are ordered by start, then end, then
//! subject so equal inputs always list in the same order.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::EventStore;
use crate::model::{BusinessKey, Event};

fn chronological(a: &&Event, b: &&Event) -> Ordering {
    a.start()
        .cmp(&b.start())
        .then_with(|| a.end().cmp(&b.end()))
        .then_with(|| a.subject().cmp(b.subject()))
}

impl EventStore {
    fn collect_sorted(&self, keep: impl Fn(&Event) -> bool) -> Vec<&Event> {
        let mut found: Vec<&Event> = self.events.values().filter(|&event| keep(event)).collect();
        found.sort_by(chronological);
        found
    }

    /// ## Summary
    /// Events whose span touches `date`, counting both the start and end dates.
    #[must_use]
    pub fn get_on_date(&self, date: NaiveDate) -> Vec<&Event> {
        self.collect_sorted(|event| event.start_date() <= date && date <= event.end_date())
    }

    /// ## Summary
    /// Events overlapping the open interval between `range_start` and `range_end`.
    ///
    /// An event that ends exactly at `range_start` or starts exactly at
    /// `range_end` does not overlap.
    #[must_use]
    pub fn get_in_range(
        &self,
        range_start: NaiveDateTime,
        range_end: NaiveDateTime,
    ) -> Vec<&Event> {
        self.collect_sorted(|event| event.start() < range_end && event.end() > range_start)
    }

    /// ## Summary
    /// Whether some event is in progress at `at`.
    ///
    /// Events occupy `[start, end)`: busy at the start instant, free at the end.
    #[must_use]
    pub fn is_busy(&self, at: NaiveDateTime) -> bool {
        self.events
            .values()
            .any(|event| event.start() <= at && event.end() > at)
    }

    /// All events, earliest first.
    #[must_use]
    pub fn get_all(&self) -> Vec<&Event> {
        self.collect_sorted(|_| true)
    }

    #[must_use]
    pub fn find_by_id(&self, id: Uuid) -> Option<&Event> {
        self.events.get(&id)
    }

    #[must_use]
    pub fn find_by_business_key(
        &self,
        subject: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<&Event> {
        let key = BusinessKey::new(subject, start, end);
        self.index.get(&key).and_then(|id| self.events.get(id))
    }

    /// ## Summary
    /// Events with this subject starting at `start`, whatever their end.
    ///
    /// Used where only the subject and start are known, e.g. copy commands.
    #[must_use]
    pub fn find_by_subject_and_start(&self, subject: &str, start: NaiveDateTime) -> Vec<&Event> {
        self.collect_sorted(|event| event.subject() == subject && event.start() == start)
    }

    /// Events still attached to `series_id`, earliest first.
    #[must_use]
    pub fn get_series_events(&self, series_id: Uuid) -> Vec<&Event> {
        self.collect_sorted(|event| event.series_id() == Some(series_id))
    }
}
