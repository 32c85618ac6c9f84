//! Parsing for the backend's local date-time format.
//!
//! Meetings and other scheduled items carry their start time as
//! `HH:mm:ss dd/MM/yyyy` (24-hour clock, every field zero-padded) in the
//! server's local time zone.  This is deliberately narrow: ISO-8601 and
//! every other shape are rejected rather than guessed at.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Display/parse pattern in chrono notation.
pub const LOCAL_DATE_TIME_FORMAT: &str = "%H:%M:%S %d/%m/%Y";

static LOCAL_DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2}) ([0-9]{2})/([0-9]{2})/([0-9]{4})$").expect("static pattern is valid")
});

/// Splits `input` into its wall-clock components without consulting any
/// time zone.  Returns `None` for anything that is not exactly
/// `HH:mm:ss dd/MM/yyyy` or names an impossible date or time.
pub fn parse_naive_date_time(input: &str) -> Option<NaiveDateTime> {
    let caps = LOCAL_DATE_TIME.captures(input)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (hour, minute, second) = (field(1)?, field(2)?, field(3)?);
    let (day, month) = (field(4)?, field(5)?);
    let year = caps.get(6)?.as_str().parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Parses `input` as a timestamp in the process's local time zone.
///
/// Never fails loudly: malformed input, impossible calendar values
/// (`25:00:00 ...`, `31/02/...`) and wall-clock times skipped by a DST
/// transition all yield `None`.  When a DST fold makes the time
/// ambiguous the earlier instant is chosen.
pub fn parse_local_date_time(input: &str) -> Option<DateTime<chrono::Local>> {
    parse_in_zone(input, &chrono::Local)
}

/// Same as [`parse_local_date_time`] but in an explicit zone, so callers
/// (and tests) are not tied to the host configuration.
pub fn parse_in_zone<Tz: TimeZone>(input: &str, zone: &Tz) -> Option<DateTime<Tz>> {
    let Some(naive) = parse_naive_date_time(input) else {
        debug!(input, "value does not match HH:mm:ss dd/MM/yyyy");
        return None;
    };
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            debug!(input, "local time does not exist in this time zone");
            None
        }
    }
}

/// Formats a timestamp back into `HH:mm:ss dd/MM/yyyy` in its own zone.
pub fn format_local_date_time<Tz: TimeZone>(value: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    value.format(LOCAL_DATE_TIME_FORMAT).to_string()
}
