use super::time::local_date;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// A calendar event decoded from the feed
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub url: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
}

impl CalendarEvent {
    /// Local calendar date of the start
    pub fn start_date(&self, tz: &Tz) -> Option<NaiveDate> {
        self.start.map(|start| local_date(start, tz))
    }

    /// Last calendar date the event occupies.
    ///
    /// All-day ends are exclusive, so one day is taken off. An end that
    /// collapses onto or before the start date yields the start date.
    pub fn inclusive_end_date(&self, tz: &Tz) -> Option<NaiveDate> {
        let start = self.start_date(tz)?;
        let Some(end) = self.end else {
            return Some(start);
        };

        let mut end_date = local_date(end, tz);
        if self.all_day {
            end_date = end_date - Duration::days(1);
        }

        Some(end_date.max(start))
    }

    /// True when the event covers more than one calendar date
    pub fn is_multi_day(&self, tz: &Tz) -> bool {
        match (self.start_date(tz), self.inclusive_end_date(tz)) {
            (Some(start), Some(end)) => end > start,
            _ => false,
        }
    }
}
