//! Recurring series configuration.

use std::collections::HashSet;

use chrono::{NaiveDate, Weekday};
use kalends_core::error::{CoreError, CoreResult};
use uuid::Uuid;

use super::Event;

/// How a series stops generating occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stop after this many occurrences.
    Count(u32),
    /// Stop after this date (inclusive).
    Until(NaiveDate),
}

impl Termination {
    /// ## Summary
    /// Builds a termination from its flag form: `use_count` selects which of
    /// `count` or `until` must be present.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` if the selected value is missing or
    /// the other one is also present.
    pub fn from_parts(
        use_count: bool,
        count: Option<u32>,
        until: Option<NaiveDate>,
    ) -> CoreResult<Self> {
        match (use_count, count, until) {
            (true, Some(count), None) => Ok(Self::Count(count)),
            (false, None, Some(until)) => Ok(Self::Until(until)),
            _ => Err(CoreError::ValidationError(
                "exactly one of occurrence count or end date must be given".to_string(),
            )),
        }
    }
}

/// ## Summary
/// A template event repeated on a set of weekdays until a termination.
///
/// The template's date is where expansion starts; its time of day and
/// duration are copied to every occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSeries {
    series_id: Uuid,
    template: Event,
    weekdays: HashSet<Weekday>,
    termination: Termination,
}

impl EventSeries {
    /// ## Summary
    /// Creates a series with a fresh id.
    ///
    /// An empty weekday set is accepted and expands to no occurrences.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` if the count is zero.
    ///
    /// An end date before the template's date is accepted: the first day is
    /// still scanned, so the series has at most one occurrence.
    pub fn new(
        template: Event,
        weekdays: impl IntoIterator<Item = Weekday>,
        termination: Termination,
    ) -> CoreResult<Self> {
        if termination == Termination::Count(0) {
            return Err(CoreError::ValidationError(
                "occurrence count must be positive".to_string(),
            ));
        }

        Ok(Self {
            series_id: Uuid::now_v7(),
            template: template.detached(),
            weekdays: weekdays.into_iter().collect(),
            termination,
        })
    }

    #[must_use]
    pub fn series_id(&self) -> Uuid {
        self.series_id
    }

    #[must_use]
    pub fn template(&self) -> &Event {
        &self.template
    }

    #[must_use]
    pub fn weekdays(&self) -> &HashSet<Weekday> {
        &self.weekdays
    }

    #[must_use]
    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub(crate) fn with_template(mut self, template: Event) -> Self {
        self.template = template.detached();
        self
    }

    #[must_use]
    pub fn occurs_on(&self, weekday: Weekday) -> bool {
        self.weekdays.contains(&weekday)
    }
}
