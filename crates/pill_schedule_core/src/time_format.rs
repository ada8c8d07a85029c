//! crates/pill_schedule_core/src/time_format.rs
//!
//! Conversion of stored 24-hour clock strings into 12-hour display form.

use chrono::NaiveTime;

use crate::error::{ScheduleError, ScheduleResult};

/// Parses a strict `HH:MM` 24-hour clock value.
pub fn parse_clock(clock: &str) -> ScheduleResult<NaiveTime> {
    let invalid = || ScheduleError::InvalidTime(clock.to_string());

    // chrono tolerates single-digit fields, the stored format does not.
    let bytes = clock.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !well_formed {
        return Err(invalid());
    }

    NaiveTime::parse_from_str(clock, "%H:%M").map_err(|_| invalid())
}

/// Formats `HH:MM` as `hh:MM AM|PM`, e.g. `"13:30"` becomes `"01:30 PM"`.
pub fn to_12_hour(clock: &str) -> ScheduleResult<String> {
    let time = parse_clock(clock)?;
    Ok(time.format("%I:%M %p").to_string())
}
