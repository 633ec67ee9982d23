use super::grid::build_month_grid;
use super::query::{events_on_date, group_by_date};
use crate::components::ics::time::{format_date, format_short_date, format_time, local_date, month_name};
use crate::components::ics::CalendarEvent;
use chrono::{Month, NaiveDate};
use chrono_tz::Tz;
use rust_i18n::t;
use std::fmt::Write;

/// Agenda text: one heading per start date followed by its events
pub fn format_agenda(events: &[CalendarEvent], tz: &Tz) -> String {
    if events.is_empty() {
        return t!("calendar_no_events").to_string();
    }

    let mut out = String::new();
    for (day, bucket) in group_by_date(events, tz) {
        let heading = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
            .map(format_date)
            .unwrap_or(day);
        let _ = writeln!(out, "{}", heading);
        for event in &bucket {
            let _ = writeln!(out, "  {}", format_event_line(event, tz));
        }
        out.push('\n');
    }

    out.trim_end().to_string()
}

/// One agenda line: time range, title, location and id
pub fn format_event_line(event: &CalendarEvent, tz: &Tz) -> String {
    let mut line = format!("{:<20} {}", time_label(event, tz), event.title);
    if !event.location.is_empty() {
        let _ = write!(line, " @ {}", event.location);
    }
    let _ = write!(line, "  [{}]", event.id);
    line
}

/// Month grid with the number of events on each day
pub fn format_month_grid(year: i32, month: Month, events: &[CalendarEvent], tz: &Tz) -> Option<String> {
    let grid = build_month_grid(year, month)?;

    let mut out = String::new();
    let _ = writeln!(out, "{} {}", month_name(month), year);
    let _ = writeln!(out, "{}", t!("calendar_weekday_header"));

    for week in grid {
        let row: Vec<String> = week
            .iter()
            .map(|cell| {
                if !cell.is_current_month {
                    return "   .  ".to_string();
                }
                match events_on_date(events, cell.date, tz).len() {
                    0 => format!("  {:>2}  ", cell.day_number),
                    count => format!("  {:>2}+{}", cell.day_number, count.min(9)),
                }
            })
            .collect();
        let _ = writeln!(out, "{}", row.concat().trim_end());
    }

    Some(out.trim_end().to_string())
}

fn time_label(event: &CalendarEvent, tz: &Tz) -> String {
    let Some(start) = event.start else {
        return t!("calendar_unknown_time").to_string();
    };

    if event.all_day {
        return match event.inclusive_end_date(tz) {
            Some(end) if event.is_multi_day(tz) => {
                t!("calendar_all_day_until", date = format_short_date(end)).to_string()
            }
            _ => t!("calendar_all_day").to_string(),
        };
    }

    match event.end {
        Some(end) if local_date(end, tz) == local_date(start, tz) => {
            format!("{} – {}", format_time(start, tz), format_time(end, tz))
        }
        _ => format_time(start, tz),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::UTC;

    fn concert() -> CalendarEvent {
        CalendarEvent {
            id: "concert-1".to_string(),
            title: "Concert".to_string(),
            location: "Main hall".to_string(),
            start: Some(Utc.with_ymd_and_hms(2026, 2, 14, 19, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2026, 2, 14, 21, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_event_line() {
        let line = format_event_line(&concert(), &UTC);
        assert!(line.starts_with("7:00 PM – 9:00 PM"));
        assert!(line.contains("Concert @ Main hall"));
        assert!(line.ends_with("[concert-1]"));
    }

    #[test]
    fn test_agenda_groups_by_day() {
        let mut other = concert();
        other.id = "talk-1".to_string();
        other.title = "Talk".to_string();
        other.location.clear();
        other.start = Some(Utc.with_ymd_and_hms(2026, 2, 16, 10, 0, 0).unwrap());
        other.end = None;

        let text = format_agenda(&[other, concert()], &UTC);
        let concert_at = text.find("Saturday, February 14, 2026").unwrap();
        let talk_at = text.find("Monday, February 16, 2026").unwrap();
        assert!(concert_at < talk_at);
        assert!(text.contains("10:00 AM"));
    }

    #[test]
    fn test_month_grid_counts_events() {
        let text = format_month_grid(2026, Month::February, &[concert()], &UTC).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "February 2026");
        // Heading, weekday header and four weeks
        assert_eq!(lines.len(), 6);
        assert!(lines[3].contains("14+1"));
    }
}
