//! Copying events from the active calendar into another calendar.
//!
//! Copies are standalone events with fresh ids. Each copy is inserted on its
//! own, so one collision or conversion failure does not undo the copies
//! already made.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use super::registry::CalendarRegistry;
use super::timezone::convert_between;
use crate::error::EngineResult;
use crate::model::Event;
use crate::store::EventStore;

/// Tally of a best-effort copy.
#[must_use]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    pub failed: usize,
}

impl CopyReport {
    #[must_use]
    pub fn total(self) -> usize {
        self.copied + self.failed
    }
}

/// A source event with the start its copy takes in the target calendar, or
/// the reason it cannot be placed.
type PlannedCopy = (Event, EngineResult<NaiveDateTime>);

fn commit_copies(target: &mut EventStore, planned: Vec<PlannedCopy>) -> CopyReport {
    let mut report = CopyReport::default();
    for (source, start) in planned {
        let outcome = start.map(|start| target.create_event(source.copied_to(start)));
        match outcome {
            Ok(outcome) if outcome.is_success() => report.copied += 1,
            Ok(_) => report.failed += 1,
            Err(e) => {
                tracing::warn!(error = %e, subject = %source.subject(), "Copy could not be placed");
                report.failed += 1;
            }
        }
    }
    report
}

impl CalendarRegistry {
    /// ## Summary
    /// Copies the active calendar's events named `subject` starting at `start`
    /// so they start at `target_start` in `target`, keeping their duration.
    ///
    /// `target_start` is read in the target calendar's timezone.
    ///
    /// ## Errors
    /// Returns `EngineError::CalendarNotFound` if no calendar is active or
    /// `target` does not exist.
    #[tracing::instrument(skip(self))]
    pub fn copy_event(
        &mut self,
        subject: &str,
        start: NaiveDateTime,
        target: &str,
        target_start: NaiveDateTime,
    ) -> EngineResult<CopyReport> {
        let source = self.get(self.active_name()?)?;
        self.get(target)?;

        let planned: Vec<PlannedCopy> = source
            .store()
            .find_by_subject_and_start(subject, start)
            .into_iter()
            .map(|event| (event.clone(), Ok(target_start)))
            .collect();
        if planned.is_empty() {
            tracing::debug!("No matching event to copy");
        }

        let report = commit_copies(self.get_mut(target)?.store_mut(), planned);
        tracing::debug!(copied = report.copied, failed = report.failed, "Copy finished");
        Ok(report)
    }

    /// ## Summary
    /// Copies every event of the active calendar on `date` to `target_date` in
    /// `target`, converting times into the target calendar's timezone.
    ///
    /// ## Errors
    /// Returns `EngineError::CalendarNotFound` if no calendar is active or
    /// `target` does not exist.
    #[tracing::instrument(skip(self))]
    pub fn copy_events_on(
        &mut self,
        date: NaiveDate,
        target: &str,
        target_date: NaiveDate,
    ) -> EngineResult<CopyReport> {
        let source = self.get(self.active_name()?)?;
        let target_tz = self.get(target)?.timezone();

        let events: Vec<Event> = source
            .store()
            .get_on_date(date)
            .into_iter()
            .cloned()
            .collect();
        let planned = plan_shifted(events, date, target_date, source.timezone(), target_tz);

        let report = commit_copies(self.get_mut(target)?.store_mut(), planned);
        tracing::debug!(copied = report.copied, failed = report.failed, "Copy finished");
        Ok(report)
    }

    /// ## Summary
    /// Copies every event of the active calendar overlapping the dates `from`
    /// through `to` (inclusive) into `target`, with `from` landing on
    /// `target_start`. Times are converted into the target calendar's timezone.
    ///
    /// ## Errors
    /// Returns `EngineError::CalendarNotFound` if no calendar is active or
    /// `target` does not exist.
    #[tracing::instrument(skip(self))]
    pub fn copy_events_between(
        &mut self,
        from: NaiveDate,
        to: NaiveDate,
        target: &str,
        target_start: NaiveDate,
    ) -> EngineResult<CopyReport> {
        let source = self.get(self.active_name()?)?;
        let target_tz = self.get(target)?.timezone();

        let range_start = from.and_time(NaiveTime::MIN);
        let range_end = to
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN);
        let events: Vec<Event> = source
            .store()
            .get_in_range(range_start, range_end)
            .into_iter()
            .cloned()
            .collect();
        let planned = plan_shifted(events, from, target_start, source.timezone(), target_tz);

        let report = commit_copies(self.get_mut(target)?.store_mut(), planned);
        tracing::debug!(copied = report.copied, failed = report.failed, "Copy finished");
        Ok(report)
    }
}

/// Moves each event by the day offset from `anchor` to `target_anchor` in the
/// source zone, then converts the new start into the target zone.
fn plan_shifted(
    events: Vec<Event>,
    anchor: NaiveDate,
    target_anchor: NaiveDate,
    source_tz: Tz,
    target_tz: Tz,
) -> Vec<PlannedCopy> {
    let offset = target_anchor - anchor;
    events
        .into_iter()
        .map(|event| {
            let start = convert_between(event.start() + offset, source_tz, target_tz);
            (event, start)
        })
        .collect()
}
