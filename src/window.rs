//! Calendar-day filtering of scheduled items.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::datetime::parse_in_zone;
use crate::models::Meeting;

/// Items whose `time_of` value parses to a timestamp on `target`
/// (calendar date in `zone`), sorted ascending by that timestamp.
///
/// Unparseable values are dropped.  Items with equal timestamps keep
/// their input order.
pub fn on_calendar_day_in<'a, T, F, Tz>(items: &'a [T], time_of: F, target: NaiveDate, zone: &Tz) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
    Tz: TimeZone,
{
    let mut hits: Vec<(DateTime<Tz>, &T)> = items
        .iter()
        .filter_map(|item| parse_in_zone(time_of(item), zone).map(|at| (at, item)))
        .filter(|(at, _)| at.date_naive() == target)
        .collect();
    hits.sort_by(|a, b| a.0.cmp(&b.0));
    hits.into_iter().map(|(_, item)| item).collect()
}

/// [`on_calendar_day_in`] against the process's local time zone.
pub fn on_calendar_day<'a, T, F>(items: &'a [T], time_of: F, target: NaiveDate) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    on_calendar_day_in(items, time_of, target, &chrono::Local)
}

/// Meetings starting on `target`, earliest first.
pub fn meetings_on(meetings: &[Meeting], target: NaiveDate) -> Vec<Meeting> {
    on_calendar_day(meetings, |m| m.start_time.as_str(), target)
        .into_iter()
        .cloned()
        .collect()
}
