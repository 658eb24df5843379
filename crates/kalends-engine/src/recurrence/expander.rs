//! Weekday-set recurrence expansion.
//!
//! Expansion walks the calendar one day at a time from the template's start
//! date and emits an occurrence on every day whose weekday belongs to the
//! series. The walk ends on the series termination or, failing that, on the
//! scan limit.

use chrono::{Datelike, Months, NaiveDate};

use crate::model::{Event, EventSeries, Termination};

/// ## Summary
/// How far past the template's start date a scan may run (10 years).
///
/// This bounds series whose weekday set is empty, which would otherwise never
/// meet a count termination.
pub const SCAN_LIMIT_MONTHS: u32 = 120;

/// ## Summary
/// Expands a series into its occurrences, in ascending date order.
///
/// Each occurrence copies the template's subject, description, location,
/// privacy, time of day and duration, receives a fresh id, and carries the
/// series id. An empty result is a valid outcome.
#[must_use]
pub fn expand(series: &EventSeries) -> Vec<Event> {
    let template = series.template();
    let first_day = template.start_date();
    let start_time = template.start().time();
    let scan_limit = first_day
        .checked_add_months(Months::new(SCAN_LIMIT_MONTHS))
        .unwrap_or(NaiveDate::MAX);

    tracing::trace!(
        series_id = %series.series_id(),
        first_day = %first_day,
        termination = ?series.termination(),
        weekday_count = series.weekdays().len(),
        "Expanding series"
    );

    let mut occurrences = Vec::new();
    let mut day = first_day;
    let mut emitted: u32 = 0;

    while day <= scan_limit {
        if series.occurs_on(day.weekday()) {
            let occurrence = template
                .copied_to(day.and_time(start_time))
                .in_series(series.series_id());
            occurrences.push(occurrence);
            emitted += 1;

            if let Termination::Count(target) = series.termination()
                && emitted >= target
            {
                break;
            }
        }

        if let Termination::Until(until) = series.termination()
            && day >= until
        {
            break;
        }

        let Some(next) = day.succ_opt() else {
            break;
        };
        day = next;
    }

    tracing::trace!(
        series_id = %series.series_id(),
        occurrences = occurrences.len(),
        "Series expanded"
    );

    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeDelta, Weekday};

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid test datetime")
    }

    /// Monday 2025-06-09, 09:00-09:30.
    fn monday_standup() -> Event {
        Event::builder()
            .subject("Standup")
            .start(at(2025, 6, 9, 9, 0))
            .end(at(2025, 6, 9, 9, 30))
            .description("daily sync")
            .location("")
            .private(true)
            .build()
            .unwrap()
    }

    #[test_log::test]
    fn test_count_termination_stops_on_target() {
        let series =
            EventSeries::new(monday_standup(), [Weekday::Mon], Termination::Count(3)).unwrap();
        let occurrences = expand(&series);

        let starts: Vec<_> = occurrences.iter().map(Event::start).collect();
        assert_eq!(
            starts,
            vec![
                at(2025, 6, 9, 9, 0),
                at(2025, 6, 16, 9, 0),
                at(2025, 6, 23, 9, 0),
            ]
        );
    }

    #[test]
    fn test_occurrences_copy_template_fields() {
        let series =
            EventSeries::new(monday_standup(), [Weekday::Mon], Termination::Count(2)).unwrap();

        for occurrence in expand(&series) {
            assert_eq!(occurrence.subject(), "Standup");
            assert_eq!(occurrence.description(), Some("daily sync"));
            assert_eq!(occurrence.location(), Some(""));
            assert!(occurrence.is_private());
            assert_eq!(occurrence.duration(), TimeDelta::minutes(30));
            assert_eq!(occurrence.series_id(), Some(series.series_id()));
            assert_ne!(occurrence.id(), series.template().id());
        }
    }

    #[test]
    fn test_until_is_inclusive() {
        let until = NaiveDate::from_ymd_opt(2025, 6, 23).unwrap();
        let series =
            EventSeries::new(monday_standup(), [Weekday::Mon], Termination::Until(until))
                .unwrap();

        let occurrences = expand(&series);
        assert_eq!(occurrences.len(), 3);
        assert_eq!(
            occurrences.last().map(Event::start_date),
            Some(until)
        );
    }

    #[test]
    fn test_until_stops_after_end_date_without_match() {
        // Tuesday end date: the Monday after must not appear.
        let until = NaiveDate::from_ymd_opt(2025, 6, 17).unwrap();
        let series =
            EventSeries::new(monday_standup(), [Weekday::Mon], Termination::Until(until))
                .unwrap();

        assert_eq!(expand(&series).len(), 2);
    }

    #[test]
    fn test_first_day_skipped_when_weekday_not_selected() {
        let series =
            EventSeries::new(monday_standup(), [Weekday::Tue], Termination::Count(1)).unwrap();
        let occurrences = expand(&series);

        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].start(), at(2025, 6, 10, 9, 0));
    }

    #[test]
    fn test_weekday_filtering() {
        let template = Event::new("Gym", at(2025, 6, 9, 10, 0), at(2025, 6, 9, 11, 0)).unwrap();
        let series =
            EventSeries::new(template, [Weekday::Mon, Weekday::Wed], Termination::Count(10))
                .unwrap();
        let occurrences = expand(&series);

        assert_eq!(occurrences.len(), 10);
        assert!(
            occurrences
                .iter()
                .all(|o| matches!(o.start().weekday(), Weekday::Mon | Weekday::Wed))
        );
        assert!(occurrences.windows(2).all(|w| w[0].start() < w[1].start()));
    }

    #[test]
    fn test_empty_weekday_set_expands_to_nothing() {
        let series =
            EventSeries::new(monday_standup(), Vec::new(), Termination::Count(5)).unwrap();
        assert!(expand(&series).is_empty());
    }

    #[test]
    fn test_scan_limit_caps_long_counts() {
        // Ten years of Mondays is roughly 522; asking for more stops at the limit.
        let series =
            EventSeries::new(monday_standup(), [Weekday::Mon], Termination::Count(10_000))
                .unwrap();
        let occurrences = expand(&series);

        let limit = at(2035, 6, 9, 23, 59);
        assert!(occurrences.len() > 500);
        assert!(occurrences.len() < 600);
        assert!(occurrences.iter().all(|o| o.start() <= limit));
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let series = EventSeries::new(
            monday_standup(),
            [Weekday::Mon, Weekday::Fri],
            Termination::Count(6),
        )
        .unwrap();

        let first = expand(&series);
        let second = expand(&series);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert!(a.same_key(b));
            assert_eq!(a.description(), b.description());
            assert_eq!(a.location(), b.location());
            assert_eq!(a.is_private(), b.is_private());
        }
    }
}
