//! Scoped edits: one event, a series from a date onwards, or a whole series.
//!
//! A patch that moves the start of a series member splits that member off
//! its series. Series edits apply the patch's time of day to each member's
//! own date, so every selected occurrence shifts by the same clock change.
//! Only a start change across the entire series unregisters it.

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use super::{EditOutcome, EventStore};
use crate::error::EngineResult;
use crate::model::{Event, EventPatch};

impl EventStore {
    /// ## Summary
    /// Applies `patch` to the event with `id`.
    ///
    /// A new start without a new end keeps the event's duration. Moving the
    /// start of a series member detaches it from the series.
    ///
    /// ## Errors
    /// Returns a validation error if the edited event would be invalid, e.g.
    /// a blank subject or an end before the start. The store is unchanged.
    #[tracing::instrument(skip(self, patch))]
    pub fn edit_single(&mut self, id: Uuid, patch: &EventPatch) -> EngineResult<EditOutcome> {
        let Some(current) = self.events.get(&id) else {
            tracing::debug!("No event with this id");
            return Ok(EditOutcome::NotFound);
        };

        let mut edited = current.with_changes(patch)?;
        if patch.changes_start() {
            edited = edited.detached();
        }

        if let Some(&owner) = self.index.get(&edited.key())
            && owner != id
        {
            tracing::warn!(collision = %edited.key(), "Edit would duplicate another event");
            return Ok(EditOutcome::Conflict);
        }

        self.commit_replacements(vec![edited]);

        tracing::debug!("Event edited");
        Ok(EditOutcome::Applied(1))
    }

    /// ## Summary
    /// Applies `patch` to every member of a series starting on or after `from`.
    ///
    /// Members before `from` are untouched. The series stays registered even
    /// when every member is split off.
    ///
    /// ## Errors
    /// Returns a validation error if any rewritten member would be invalid.
    /// The store is unchanged.
    #[tracing::instrument(skip(self, patch))]
    pub fn edit_series_from(
        &mut self,
        series_id: Uuid,
        from: NaiveDate,
        patch: &EventPatch,
    ) -> EngineResult<EditOutcome> {
        self.edit_series_members(series_id, patch, |event| event.start_date() >= from)
    }

    /// ## Summary
    /// Applies `patch` to every member of a series.
    ///
    /// When the patch moves the start, every member is split off and the
    /// series is unregistered.
    ///
    /// ## Errors
    /// Returns a validation error if any rewritten member would be invalid.
    /// The store is unchanged.
    #[tracing::instrument(skip(self, patch))]
    pub fn edit_entire_series(
        &mut self,
        series_id: Uuid,
        patch: &EventPatch,
    ) -> EngineResult<EditOutcome> {
        let outcome = self.edit_series_members(series_id, patch, |_| true)?;
        if outcome.is_success() && patch.changes_start() {
            self.series.remove(&series_id);
            tracing::debug!("Series fully split; unregistered");
        }
        Ok(outcome)
    }

    /// Shared body of the series edits. `selected` narrows the members.
    fn edit_series_members(
        &mut self,
        series_id: Uuid,
        patch: &EventPatch,
        selected: impl Fn(&Event) -> bool,
    ) -> EngineResult<EditOutcome> {
        if !self.series.contains_key(&series_id) {
            tracing::debug!("Series not registered");
            return Ok(EditOutcome::NotFound);
        }

        let mut members: Vec<&Event> = self
            .events
            .values()
            .filter(|&event| event.series_id() == Some(series_id) && selected(event))
            .collect();
        if members.is_empty() {
            tracing::debug!("No series members selected");
            return Ok(EditOutcome::NotFound);
        }
        members.sort_by_key(|event| event.start());

        let split = patch.changes_start();
        let mut edited = Vec::with_capacity(members.len());
        for member in &members {
            let rewritten = member.with_changes(&anchor_to(patch, member))?;
            edited.push(if split { rewritten.detached() } else { rewritten });
        }

        let edited_ids: HashSet<Uuid> = members.iter().map(|event| event.id()).collect();
        let mut batch_keys = HashSet::with_capacity(edited.len());
        for event in &edited {
            let key = event.key();
            let taken_outside = self
                .index
                .get(&key)
                .is_some_and(|owner| !edited_ids.contains(owner));
            if taken_outside || !batch_keys.insert(key) {
                tracing::warn!(
                    collision = %event.key(),
                    selected = edited.len(),
                    "Series edit would duplicate an event; nothing changed"
                );
                return Ok(EditOutcome::Conflict);
            }
        }

        let count = edited.len();
        self.commit_replacements(edited);
        tracing::debug!(edited = count, split, "Series members edited");
        Ok(EditOutcome::Applied(count))
    }
}

/// Rebases the patch's start and end times onto `event`'s own dates.
fn anchor_to(patch: &EventPatch, event: &Event) -> EventPatch {
    let mut anchored = patch.clone();
    anchored.start = patch
        .start
        .map(|start| event.start_date().and_time(start.time()));
    anchored.end = patch.end.map(|end| event.end_date().and_time(end.time()));
    anchored
}
