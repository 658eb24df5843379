//! Wall-clock conversion between IANA timezones.

use std::str::FromStr;

use chrono::{LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{EngineError, EngineResult};

/// ## Summary
/// Resolves an IANA timezone name such as `Europe/Paris`.
///
/// ## Errors
/// Returns `EngineError::UnknownTimezone` if the name is not in the database.
pub fn parse_timezone(name: &str) -> EngineResult<Tz> {
    Tz::from_str(name.trim()).map_err(|_e| EngineError::UnknownTimezone(name.to_string()))
}

/// ## Summary
/// Converts a wall-clock time in `from` to the wall-clock time of the same
/// instant in `to`.
///
/// A time repeated by a DST fold resolves to its earlier instant.
///
/// ## Errors
/// Returns `EngineError::NonExistentTime` if `local` falls in a DST gap of `from`.
pub fn convert_between(local: NaiveDateTime, from: Tz, to: Tz) -> EngineResult<NaiveDateTime> {
    if from == to {
        return Ok(local);
    }

    let instant = match from.from_local_datetime(&local) {
        LocalResult::Single(instant) => instant,
        LocalResult::Ambiguous(earliest, _latest) => {
            tracing::trace!(%local, %from, "Ambiguous local time; using earlier instant");
            earliest
        }
        LocalResult::None => {
            return Err(EngineError::NonExistentTime(format!("{local} in {from}")));
        }
    };

    Ok(instant.with_timezone(&to).naive_local())
}
