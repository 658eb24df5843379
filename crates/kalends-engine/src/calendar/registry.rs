//! Registry of named calendars.

use std::collections::HashMap;

use chrono_tz::Tz;
use kalends_core::error::CoreError;

use super::timezone::{convert_between, parse_timezone};
use crate::error::{EngineError, EngineResult};
use crate::store::EventStore;

/// A named calendar: one event store whose wall-clock times are in `timezone`.
#[derive(Debug, Clone)]
pub struct Calendar {
    name: String,
    timezone: Tz,
    store: EventStore,
}

impl Calendar {
    #[must_use]
    pub fn new(name: impl Into<String>, timezone: Tz) -> Self {
        Self {
            name: name.into(),
            timezone,
            store: EventStore::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    #[must_use]
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EventStore {
        &mut self.store
    }
}

/// ## Summary
/// Calendars by unique name, with at most one active calendar.
#[derive(Debug, Default)]
pub struct CalendarRegistry {
    calendars: HashMap<String, Calendar>,
    active: Option<String>,
}

fn validate_name(name: &str) -> EngineResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::ValidationError("calendar name must not be empty".to_string()).into());
    }
    Ok(name)
}

impl CalendarRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Creates an empty calendar.
    ///
    /// ## Errors
    /// - `EngineError::DuplicateCalendar` if the name is taken.
    /// - `EngineError::UnknownTimezone` if `timezone` is not an IANA name.
    /// - A validation error if the name is blank.
    #[tracing::instrument(skip(self))]
    pub fn create_calendar(&mut self, name: &str, timezone: &str) -> EngineResult<()> {
        let name = validate_name(name)?;
        if self.calendars.contains_key(name) {
            return Err(EngineError::DuplicateCalendar(name.to_string()));
        }
        let timezone = parse_timezone(timezone)?;

        self.calendars
            .insert(name.to_string(), Calendar::new(name, timezone));
        tracing::debug!("Calendar created");
        Ok(())
    }

    /// ## Summary
    /// Renames a calendar, keeping it active if it was.
    ///
    /// ## Errors
    /// - `EngineError::CalendarNotFound` if `current` does not exist.
    /// - `EngineError::DuplicateCalendar` if `new_name` is taken by another calendar.
    #[tracing::instrument(skip(self))]
    pub fn rename_calendar(&mut self, current: &str, new_name: &str) -> EngineResult<()> {
        let new_name = validate_name(new_name)?;
        if !self.calendars.contains_key(current) {
            return Err(EngineError::CalendarNotFound(current.to_string()));
        }
        if current == new_name {
            return Ok(());
        }
        if self.calendars.contains_key(new_name) {
            return Err(EngineError::DuplicateCalendar(new_name.to_string()));
        }

        let Some(mut calendar) = self.calendars.remove(current) else {
            return Err(EngineError::CalendarNotFound(current.to_string()));
        };
        calendar.name = new_name.to_string();
        self.calendars.insert(new_name.to_string(), calendar);

        if self.active.as_deref() == Some(current) {
            self.active = Some(new_name.to_string());
        }
        Ok(())
    }

    /// ## Summary
    /// Moves a calendar to another timezone.
    ///
    /// Events keep their instants, so their wall-clock times are converted
    /// into the new zone.
    ///
    /// ## Errors
    /// - `EngineError::CalendarNotFound` or `EngineError::UnknownTimezone`.
    /// - Any conversion error; the calendar is then unchanged.
    #[tracing::instrument(skip(self))]
    pub fn set_timezone(&mut self, name: &str, timezone: &str) -> EngineResult<()> {
        let new_tz = parse_timezone(timezone)?;
        let calendar = self.get_mut(name)?;
        let old_tz = calendar.timezone;

        calendar
            .store
            .retime_all(|local| convert_between(local, old_tz, new_tz))?;
        calendar.timezone = new_tz;
        tracing::debug!(from = %old_tz, to = %new_tz, "Calendar timezone changed");
        Ok(())
    }

    /// ## Summary
    /// Makes `name` the active calendar.
    ///
    /// ## Errors
    /// Returns `EngineError::CalendarNotFound` if no such calendar exists.
    pub fn use_calendar(&mut self, name: &str) -> EngineResult<()> {
        if !self.calendars.contains_key(name) {
            return Err(EngineError::CalendarNotFound(name.to_string()));
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    #[must_use]
    pub fn active(&self) -> Option<&Calendar> {
        self.active
            .as_deref()
            .and_then(|name| self.calendars.get(name))
    }

    pub fn active_mut(&mut self) -> Option<&mut Calendar> {
        self.active
            .as_deref()
            .and_then(|name| self.calendars.get_mut(name))
    }

    /// ## Errors
    /// Returns `EngineError::CalendarNotFound` if no such calendar exists.
    pub fn get(&self, name: &str) -> EngineResult<&Calendar> {
        self.calendars
            .get(name)
            .ok_or_else(|| EngineError::CalendarNotFound(name.to_string()))
    }

    /// ## Errors
    /// Returns `EngineError::CalendarNotFound` if no such calendar exists.
    pub fn get_mut(&mut self, name: &str) -> EngineResult<&mut Calendar> {
        self.calendars
            .get_mut(name)
            .ok_or_else(|| EngineError::CalendarNotFound(name.to_string()))
    }

    /// Calendar names in alphabetical order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.calendars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn active_name(&self) -> EngineResult<&str> {
        self.active
            .as_deref()
            .ok_or(EngineError::CalendarNotFound("no calendar in use".to_string()))
    }
}
