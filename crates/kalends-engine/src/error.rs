use thiserror::Error;

/// Engine-level errors.
///
/// Collisions and lookups that miss are reported through
/// [`crate::store::CreateOutcome`] and [`crate::store::EditOutcome`], never here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    CoreError(#[from] kalends_core::error::CoreError),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Calendar already exists: {0}")]
    DuplicateCalendar(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
