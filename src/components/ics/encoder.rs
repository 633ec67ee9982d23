use super::models::CalendarEvent;
use super::time::{encode_token, format_clock_time, local_date, parse_clock_time, resolve_local};
use crate::error::{export_error, CalendarResult};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Product identifier written into every exported document
pub const PRODUCT_ID: &str = "-//Kalenteri//Event Export//EN";
/// MIME type of exported files
pub const ICS_MIME_TYPE: &str = "text/calendar";
/// Time value meaning "no specific time"
pub const ALL_DAY_SENTINEL: &str = "All Day";
/// Length of exported events without an explicit end
pub const DEFAULT_EXPORT_DURATION_HOURS: i64 = 2;

/// Maximum content line length in octets before folding
const FOLD_LIMIT: usize = 75;

/// Event as it is handed to the exporter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportEvent {
    pub title: String,
    pub date: NaiveDate,
    /// 12-hour clock time such as `7:30 PM`, or the all-day sentinel
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Exact start instant, preferred over `date` and `time` when set
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ExportEvent {
    /// Adapt a decoded event for export
    pub fn from_calendar_event(event: &CalendarEvent, tz: &Tz) -> Option<Self> {
        let start = event.start?;
        let time = (!event.all_day).then(|| format_clock_time(start, tz));

        Some(Self {
            title: event.title.clone(),
            date: local_date(start, tz),
            time,
            location: non_empty(&event.location),
            description: non_empty(&event.description),
            start: Some(start),
            end: event.end,
        })
    }

    /// Start instant; missing, all-day or unparseable times start at local midnight
    pub fn start(&self, tz: &Tz) -> Option<DateTime<Utc>> {
        if let Some(start) = self.start {
            return Some(start);
        }

        let time = self
            .time
            .as_deref()
            .filter(|t| !t.trim().eq_ignore_ascii_case(ALL_DAY_SENTINEL))
            .and_then(|t| {
                let parsed = parse_clock_time(t);
                if parsed.is_none() {
                    debug!("Unrecognized export time '{}', using midnight", t);
                }
                parsed
            });
        let time = match time {
            Some(time) => time,
            None => NaiveTime::from_hms_opt(0, 0, 0)?,
        };

        resolve_local(self.date.and_time(time), tz)
    }
}

/// A rendered `.ics` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsExport {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

impl IcsExport {
    /// Write the file into `dir` and return its path
    pub async fn write_to(&self, dir: &Path) -> CalendarResult<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.filename);
        tokio::fs::write(&path, &self.content).await?;
        Ok(path)
    }
}

/// Serialize one event into a minimal single-event calendar document
pub fn encode(event: &ExportEvent, tz: &Tz) -> CalendarResult<String> {
    encode_at(event, tz, Utc::now())
}

/// Same as [`encode`] with an explicit DTSTAMP
pub fn encode_at(event: &ExportEvent, tz: &Tz, stamp: DateTime<Utc>) -> CalendarResult<String> {
    let start = event
        .start(tz)
        .ok_or_else(|| export_error(&format!("Cannot resolve start of '{}'", event.title)))?;
    let end = event
        .end
        .unwrap_or_else(|| start + Duration::hours(DEFAULT_EXPORT_DURATION_HOURS));

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODUCT_ID),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}@kalenteri", Uuid::new_v4()),
        format!("DTSTAMP:{}", encode_token(stamp, false, tz)),
        format!("DTSTART:{}", encode_token(start, false, tz)),
        format!("DTEND:{}", encode_token(end, false, tz)),
        format!("SUMMARY:{}", escape_text(&event.title)),
    ];
    if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
        lines.push(format!("LOCATION:{}", escape_text(location)));
    }
    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("DESCRIPTION:{}", escape_text(description)));
    }
    lines.push("END:VEVENT".to_string());
    lines.push("END:VCALENDAR".to_string());

    let mut document = String::new();
    for line in &lines {
        document.push_str(&fold_line(line));
        document.push_str("\r\n");
    }
    Ok(document)
}

/// Render the export file for one event
pub fn export_file(event: &ExportEvent, tz: &Tz) -> CalendarResult<IcsExport> {
    Ok(IcsExport {
        filename: export_filename(&event.title),
        mime_type: ICS_MIME_TYPE,
        content: encode(event, tz)?,
    })
}

/// File name derived from the title with non-alphanumerics replaced
pub fn export_filename(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    if stem.is_empty() {
        "event.ics".to_string()
    } else {
        format!("{}.ics", stem)
    }
}

/// Apply iCalendar TEXT escaping
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.replace("\r\n", "\n").chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' | '\r' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Fold a content line at 75 octets without splitting characters
fn fold_line(line: &str) -> String {
    if line.len() <= FOLD_LIMIT {
        return line.to_string();
    }

    let mut folded = String::with_capacity(line.len() + line.len() / FOLD_LIMIT * 3);
    // Continuation lines carry a leading space, which counts towards the limit
    let mut limit = FOLD_LIMIT;
    let mut used = 0;

    for c in line.chars() {
        if used + c.len_utf8() > limit {
            folded.push_str("\r\n ");
            limit = FOLD_LIMIT - 1;
            used = 0;
        }
        folded.push(c);
        used += c.len_utf8();
    }

    folded
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
