use crate::components::ics::{encode_token, CalendarEvent};
use chrono::Duration;
use chrono_tz::Tz;
use urlencoding::encode;

const GOOGLE_TEMPLATE_URL: &str = "https://calendar.google.com/calendar/render?action=TEMPLATE";

/// Google Calendar "add event" URL for an event.
///
/// Events without an end get one hour, all-day events one day.
pub fn google_calendar_link(event: &CalendarEvent, tz: &Tz) -> String {
    let mut link = format!("{}&text={}", GOOGLE_TEMPLATE_URL, encode(&event.title));

    if let Some(start) = event.start {
        let default_length = if event.all_day {
            Duration::days(1)
        } else {
            Duration::hours(1)
        };
        let end = event.end.unwrap_or(start + default_length);
        link.push_str(&format!(
            "&dates={}/{}",
            encode_token(start, event.all_day, tz),
            encode_token(end, event.all_day, tz)
        ));
    }

    if !event.description.is_empty() {
        link.push_str(&format!("&details={}", encode(&event.description)));
    }
    if !event.location.is_empty() {
        link.push_str(&format!("&location={}", encode(&event.location)));
    }

    link
}
