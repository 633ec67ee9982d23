use crate::components::ics::CalendarEvent;
use chrono::{Month, Months, NaiveDate};
use chrono_tz::Tz;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Events occurring on `date`.
///
/// Multi-day events match every date from their start to their inclusive end.
pub fn events_on_date(events: &[CalendarEvent], date: NaiveDate, tz: &Tz) -> Vec<CalendarEvent> {
    events_in_range(events, date, date, tz)
}

/// Events starting in the month, or starting earlier and still running on its
/// first day
pub fn events_in_month(events: &[CalendarEvent], year: i32, month: Month, tz: &Tz) -> Vec<CalendarEvent> {
    let Some((first, last)) = month_bounds(year, month) else {
        return Vec::new();
    };

    events
        .iter()
        .filter(|event| match (event.start_date(tz), event.inclusive_end_date(tz)) {
            (Some(start), Some(end)) => {
                (first..=last).contains(&start) || (start < first && end >= first)
            }
            _ => false,
        })
        .cloned()
        .collect()
}

/// Events overlapping the inclusive range `from..=to`
pub fn events_in_range(events: &[CalendarEvent], from: NaiveDate, to: NaiveDate, tz: &Tz) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|event| match (event.start_date(tz), event.inclusive_end_date(tz)) {
            (Some(start), Some(end)) => start <= to && end >= from,
            _ => false,
        })
        .cloned()
        .collect()
}

/// Bucket events by ISO start date; each bucket is sorted by start
pub fn group_by_date(events: &[CalendarEvent], tz: &Tz) -> BTreeMap<String, Vec<CalendarEvent>> {
    let mut groups: BTreeMap<String, Vec<CalendarEvent>> = BTreeMap::new();

    for event in events {
        if let Some(date) = event.start_date(tz) {
            groups
                .entry(date.format("%Y-%m-%d").to_string())
                .or_default()
                .push(event.clone());
        }
    }

    for bucket in groups.values_mut() {
        sort_by_date(bucket);
    }

    groups
}

/// Stable ascending sort by start; events without a start go last
pub fn sort_by_date(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| match (a.start, b.start) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// First and last date of a month
pub fn month_bounds(year: i32, month: Month) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}
