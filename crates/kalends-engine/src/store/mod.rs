//! Duplicate-free event storage with series registry.
//!
//! ## Summary
//! [`EventStore`] keeps every event under its surrogate id together with a
//! uniqueness index from [`BusinessKey`] to id. All mutations go through
//! the store so the index and the series registry never drift from the
//! events they describe.
//!
//! Creation lives here; edits are in `edit` and reads in `query`.

mod edit;
mod query;


use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use kalends_core::error::CoreError;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::model::{BusinessKey, Event, EventSeries};
use crate::recurrence;

/// Result of a create operation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Everything was inserted; carries the number of events added.
    Created(usize),
    /// At least one event collided with a stored one. Nothing was inserted.
    Duplicate,
}

impl CreateOutcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Result of an edit operation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit was committed; carries the number of events replaced.
    Applied(usize),
    /// No event, series or selection matched.
    NotFound,
    /// A rewritten event would share its business key with another event.
    /// The store was left unchanged.
    Conflict,
}

impl EditOutcome {
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// ## Summary
/// The events of one calendar.
///
/// Invariants:
/// - no two stored events share a business key;
/// - `index` maps exactly the business keys of `events` to their ids;
/// - an event's series id, when present, names a registered series;
/// - a registered series may have no members left after splits.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: HashMap<Uuid, Event>,
    index: HashMap<BusinessKey, Uuid>,
    series: HashMap<Uuid, EventSeries>,
}

impl EventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// ## Summary
    /// Inserts a single event unless its business key is already taken.
    ///
    /// A series id that does not name a series of this store is dropped, so
    /// events copied from elsewhere arrive standalone.
    #[tracing::instrument(skip(self, event), fields(
        event_id = %event.id(),
        subject = %event.subject(),
        start = %event.start(),
        end = %event.end()
    ))]
    pub fn create_event(&mut self, event: Event) -> CreateOutcome {
        if self.index.contains_key(&event.key()) {
            tracing::warn!("Event with the same subject, start and end already exists");
            return CreateOutcome::Duplicate;
        }
        if self.events.contains_key(&event.id()) {
            tracing::warn!("Event id already stored under a different key");
            return CreateOutcome::Duplicate;
        }

        let event = match event.series_id() {
            Some(series_id) if !self.series.contains_key(&series_id) => event.detached(),
            _ => event,
        };

        self.insert(event);
        tracing::debug!("Event created");
        CreateOutcome::Created(1)
    }

    /// ## Summary
    /// Expands `series` and inserts every occurrence, or none of them.
    ///
    /// Every occurrence is checked against the store before anything is
    /// inserted. A series that expands to no occurrences is still registered.
    #[tracing::instrument(skip(self, series), fields(
        series_id = %series.series_id(),
        subject = %series.template().subject()
    ))]
    pub fn create_event_series(&mut self, series: EventSeries) -> CreateOutcome {
        let occurrences = recurrence::expand(&series);

        if let Some(collision) = occurrences
            .iter()
            .find(|occurrence| self.index.contains_key(&occurrence.key()))
        {
            tracing::warn!(
                collision = %collision.key(),
                occurrences = occurrences.len(),
                "Series occurrence collides with an existing event; nothing inserted"
            );
            return CreateOutcome::Duplicate;
        }

        let count = occurrences.len();
        for occurrence in occurrences {
            self.insert(occurrence);
        }
        self.series.insert(series.series_id(), series);

        tracing::debug!(occurrences = count, "Series created");
        CreateOutcome::Created(count)
    }

    /// ## Summary
    /// Returns the registered configuration for a series.
    #[must_use]
    pub fn series(&self, series_id: Uuid) -> Option<&EventSeries> {
        self.series.get(&series_id)
    }

    #[must_use]
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// ## Summary
    /// Rewrites the start and end of every event and series template through
    /// `retime`, keeping ids and series membership.
    ///
    /// ## Errors
    /// Fails without changing anything if `retime` fails, if a rewritten event
    /// is invalid, or if two rewritten events would share a business key.
    pub(crate) fn retime_all(
        &mut self,
        retime: impl Fn(NaiveDateTime) -> EngineResult<NaiveDateTime>,
    ) -> EngineResult<()> {
        let retime_event = |event: &Event| -> EngineResult<Event> {
            Ok(event
                .to_builder()
                .start(retime(event.start())?)
                .end(retime(event.end())?)
                .build()?)
        };

        let mut events = Vec::with_capacity(self.events.len());
        let mut keys = HashSet::with_capacity(self.events.len());
        for event in self.events.values() {
            let retimed = retime_event(event)?;
            if !keys.insert(retimed.key()) {
                return Err(CoreError::ValidationError(format!(
                    "retiming would duplicate {}",
                    retimed.key()
                ))
                .into());
            }
            events.push(retimed);
        }

        let mut series = HashMap::with_capacity(self.series.len());
        for (series_id, config) in &self.series {
            let template = retime_event(config.template())?;
            series.insert(*series_id, config.clone().with_template(template));
        }

        self.events.clear();
        self.index.clear();
        for event in events {
            self.insert(event);
        }
        self.series = series;
        Ok(())
    }

    fn insert(&mut self, event: Event) {
        self.index.insert(event.key(), event.id());
        self.events.insert(event.id(), event);
    }

    /// Swaps in a batch of rewritten events, matched to the stored ones by id.
    ///
    /// Callers have already checked the batch for key collisions. All old
    /// keys are released before any new key is claimed so members of the
    /// batch may take over each other's keys.
    fn commit_replacements(&mut self, replacements: Vec<Event>) {
        for replacement in &replacements {
            if let Some(old) = self.events.remove(&replacement.id()) {
                self.index.remove(&old.key());
            }
        }
        for replacement in replacements {
            self.insert(replacement);
        }
    }
}
