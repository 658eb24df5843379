//! The immutable [`Event`] value and the pieces used to build and change it.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use kalends_core::error::{CoreError, CoreResult};
use uuid::Uuid;

/// The `(subject, start, end)` triple that decides whether two events are the
/// same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusinessKey {
    pub subject: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl BusinessKey {
    #[must_use]
    pub fn new(subject: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            subject: subject.into(),
            start,
            end,
        }
    }
}

impl std::fmt::Display for BusinessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{} - {}]", self.subject, self.start, self.end)
    }
}

/// ## Summary
/// One calendar entry.
///
/// Values are never mutated in place. Changes go through
/// [`Event::with_changes`], which returns a new value carrying the same `id`.
/// Timestamps are wall-clock times; the owning calendar supplies the zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: Uuid,
    series_id: Option<Uuid>,
    subject: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    description: Option<String>,
    location: Option<String>,
    is_private: bool,
}

impl Event {
    /// ## Summary
    /// Creates a standalone event with a fresh id and no optional fields.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` if the subject is blank or `end`
    /// is not strictly after `start`.
    pub fn new(
        subject: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> CoreResult<Self> {
        EventBuilder::new()
            .subject(subject)
            .start(start)
            .end(end)
            .build()
    }

    #[must_use]
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn series_id(&self) -> Option<Uuid> {
        self.series_id
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.is_private
    }

    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }

    #[must_use]
    pub fn key(&self) -> BusinessKey {
        BusinessKey::new(self.subject.clone(), self.start, self.end)
    }

    /// Compares business keys without allocating.
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        self.subject == other.subject && self.start == other.start && self.end == other.end
    }

    /// ## Summary
    /// An event is all-day when it runs 08:00 to 17:00 on a single date.
    #[must_use]
    pub fn is_all_day(&self) -> bool {
        self.start.date() == self.end.date()
            && Some(self.start.time()) == NaiveTime::from_hms_opt(8, 0, 0)
            && Some(self.end.time()) == NaiveTime::from_hms_opt(17, 0, 0)
    }

    /// Returns a builder pre-filled with this event's values, including its id.
    #[must_use]
    pub fn to_builder(&self) -> EventBuilder {
        EventBuilder {
            id: Some(self.id),
            series_id: self.series_id,
            subject: Some(self.subject.clone()),
            start: Some(self.start),
            end: Some(self.end),
            description: self.description.clone(),
            location: self.location.clone(),
            is_private: self.is_private,
        }
    }

    /// ## Summary
    /// Produces the edited value for `patch`.
    ///
    /// Fields absent from the patch keep their current value. A new start
    /// without a new end moves the end so the duration is unchanged.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` if the merged event is invalid.
    pub fn with_changes(&self, patch: &EventPatch) -> CoreResult<Self> {
        let start = patch.start.unwrap_or(self.start);
        let end = match (patch.start, patch.end) {
            (_, Some(end)) => end,
            (Some(new_start), None) => new_start + self.duration(),
            (None, None) => self.end,
        };

        let mut builder = self.to_builder().start(start).end(end);
        if let Some(subject) = &patch.subject {
            builder = builder.subject(subject.clone());
        }
        if let Some(description) = &patch.description {
            builder = builder.description(description.clone());
        }
        if let Some(location) = &patch.location {
            builder = builder.location(location.clone());
        }
        if let Some(is_private) = patch.is_private {
            builder = builder.private(is_private);
        }
        builder.build()
    }

    /// Returns this event detached from any series.
    #[must_use]
    pub fn detached(mut self) -> Self {
        self.series_id = None;
        self
    }

    pub(crate) fn in_series(mut self, series_id: Uuid) -> Self {
        self.series_id = Some(series_id);
        self
    }

    /// Returns a copy under a fresh id, detached from any series, moved to
    /// `start` with the same duration.
    #[must_use]
    pub fn copied_to(&self, start: NaiveDateTime) -> Self {
        Self {
            id: Uuid::now_v7(),
            series_id: None,
            subject: self.subject.clone(),
            start,
            end: start + self.duration(),
            description: self.description.clone(),
            location: self.location.clone(),
            is_private: self.is_private,
        }
    }
}

/// ## Summary
/// Assembles an [`Event`], validating it on [`EventBuilder::build`].
///
/// A fresh id is assigned when the builder is created.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    id: Option<Uuid>,
    series_id: Option<Uuid>,
    subject: Option<String>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    description: Option<String>,
    location: Option<String>,
    is_private: bool,
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Some(Uuid::now_v7()),
            series_id: None,
            subject: None,
            start: None,
            end: None,
            description: None,
            location: None,
            is_private: false,
        }
    }

    #[must_use]
    pub fn id(mut self, id: Option<Uuid>) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn series_id(mut self, series_id: Option<Uuid>) -> Self {
        self.series_id = series_id;
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    /// ## Summary
    /// Validates the collected fields and produces the event.
    ///
    /// ## Errors
    /// - `CoreError::MissingArgument` if subject, start, end or id was never set.
    ///   Checked before any other validation.
    /// - `CoreError::ValidationError` if the subject is blank or `end <= start`.
    pub fn build(self) -> CoreResult<Event> {
        let subject = self.subject.ok_or(CoreError::MissingArgument("subject"))?;
        let start = self.start.ok_or(CoreError::MissingArgument("start"))?;
        let end = self.end.ok_or(CoreError::MissingArgument("end"))?;
        let id = self.id.ok_or(CoreError::MissingArgument("id"))?;

        if subject.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "subject must not be empty".to_string(),
            ));
        }
        if end <= start {
            return Err(CoreError::ValidationError(format!(
                "end ({end}) must be after start ({start})"
            )));
        }

        Ok(Event {
            id,
            series_id: self.series_id,
            subject,
            start,
            end,
            description: self.description,
            location: self.location,
            is_private: self.is_private,
        })
    }
}

/// ## Summary
/// The fields an edit changes. `None` means "leave as is".
///
/// `description: Some(String::new())` sets an explicit empty description,
/// which is distinct from never having one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub subject: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub is_private: Option<bool>,
}

impl EventPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn with_end(mut self, end: NaiveDateTime) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_private(mut self, is_private: bool) -> Self {
        self.is_private = Some(is_private);
        self
    }

    /// Whether applying this patch moves the start, which splits series members.
    #[must_use]
    pub fn changes_start(&self) -> bool {
        self.start.is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid test datetime")
    }

    #[test]
    fn test_new_event_has_no_optional_fields() {
        let event = Event::new("Standup", at(10, 9, 0), at(10, 9, 30)).unwrap();

        assert_eq!(event.subject(), "Standup");
        assert!(event.description().is_none());
        assert!(event.location().is_none());
        assert!(!event.is_private());
        assert!(event.series_id().is_none());
    }

    #[test]
    fn test_blank_subject_is_rejected() {
        let err = Event::new("   ", at(10, 9, 0), at(10, 10, 0)).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn test_end_must_follow_start() {
        let same = Event::new("x", at(10, 9, 0), at(10, 9, 0)).unwrap_err();
        let before = Event::new("x", at(10, 9, 0), at(10, 8, 0)).unwrap_err();

        assert!(matches!(same, CoreError::ValidationError(_)));
        assert!(matches!(before, CoreError::ValidationError(_)));
    }

    #[test]
    fn test_missing_argument_reported_before_validation() {
        // Blank subject would fail validation, but the missing end wins.
        let err = EventBuilder::new()
            .subject("  ")
            .start(at(10, 9, 0))
            .build()
            .unwrap_err();
        assert_eq!(err, CoreError::MissingArgument("end"));

        let err = EventBuilder::new()
            .subject("x")
            .start(at(10, 9, 0))
            .end(at(10, 10, 0))
            .id(None)
            .build()
            .unwrap_err();
        assert_eq!(err, CoreError::MissingArgument("id"));
    }

    #[test]
    fn test_empty_description_differs_from_absent() {
        let with_empty = Event::builder()
            .subject("x")
            .start(at(10, 9, 0))
            .end(at(10, 10, 0))
            .description("")
            .build()
            .unwrap();

        assert_eq!(with_empty.description(), Some(""));
        assert_eq!(with_empty.location(), None);
    }

    #[test]
    fn test_all_day_predicate() {
        let all_day = Event::new("Offsite", at(10, 8, 0), at(10, 17, 0)).unwrap();
        let short = Event::new("Offsite", at(10, 8, 0), at(10, 16, 59)).unwrap();
        let spanning = Event::new("Offsite", at(10, 8, 0), at(11, 17, 0)).unwrap();

        assert!(all_day.is_all_day());
        assert!(!short.is_all_day());
        assert!(!spanning.is_all_day());
    }

    #[test]
    fn test_ids_are_unique_and_ignored_by_key() {
        let a = Event::new("x", at(10, 9, 0), at(10, 10, 0)).unwrap();
        let b = Event::new("x", at(10, 9, 0), at(10, 10, 0)).unwrap();

        assert_ne!(a.id(), b.id());
        assert_eq!(a.key(), b.key());
        assert!(a.same_key(&b));
    }

    #[test]
    fn test_with_changes_preserves_duration_on_start_move() {
        let event = Event::new("x", at(10, 9, 0), at(10, 10, 30)).unwrap();
        let moved = event
            .with_changes(&EventPatch::new().with_start(at(10, 13, 0)))
            .unwrap();

        assert_eq!(moved.id(), event.id());
        assert_eq!(moved.start(), at(10, 13, 0));
        assert_eq!(moved.end(), at(10, 14, 30));
    }

    #[test]
    fn test_with_changes_explicit_end_wins() {
        let event = Event::new("x", at(10, 9, 0), at(10, 10, 0)).unwrap();
        let moved = event
            .with_changes(
                &EventPatch::new()
                    .with_start(at(10, 11, 0))
                    .with_end(at(10, 11, 15)),
            )
            .unwrap();

        assert_eq!(moved.end(), at(10, 11, 15));
    }

    #[test]
    fn test_with_changes_rejects_end_before_start() {
        let event = Event::new("x", at(10, 9, 0), at(10, 10, 0)).unwrap();
        let err = event
            .with_changes(&EventPatch::new().with_end(at(10, 8, 0)))
            .unwrap_err();

        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let event = Event::builder()
            .subject("x")
            .start(at(10, 9, 0))
            .end(at(10, 10, 0))
            .location("Room 4")
            .private(true)
            .build()
            .unwrap();

        let patch = EventPatch::new();
        assert!(patch.is_empty());
        assert_eq!(event.with_changes(&patch).unwrap(), event);
    }

    #[test]
    fn test_copied_to_gets_fresh_identity() {
        let event = Event::builder()
            .subject("x")
            .start(at(10, 9, 0))
            .end(at(10, 10, 0))
            .series_id(Some(Uuid::now_v7()))
            .build()
            .unwrap();

        let copy = event.copied_to(at(12, 14, 0));
        assert_ne!(copy.id(), event.id());
        assert!(copy.series_id().is_none());
        assert_eq!(copy.end(), at(12, 15, 0));
    }
}
