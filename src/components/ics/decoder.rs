//! Line-oriented decoder for iCalendar feeds.
//!
//! The decoder is a fold over unfolded content lines. The only state carried
//! between lines is [`DecodeState`]: the event currently being accumulated
//! (if any) and the events finished so far.

use super::models::CalendarEvent;
use super::time::decode_token;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;
use uuid::Uuid;

/// A content line split into its property name and raw value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine<'a> {
    /// Upper-cased name with any `;PARAM=value` suffix removed
    pub name: String,
    pub value: &'a str,
}

/// Decode feed text into events, in source order
pub fn decode(feed_text: &str, tz: &Tz) -> Vec<CalendarEvent> {
    let state = unfold_lines(feed_text)
        .iter()
        .filter_map(|line| split_content_line(line))
        .fold(DecodeState::default(), |state, line| state.apply(&line, tz));

    debug!(
        kept = state.events.len(),
        dropped = state.dropped + usize::from(state.current.is_some()),
        "Decoded calendar feed"
    );

    state.events
}

/// Split on any line terminator and join continuation lines.
///
/// A physical line beginning with a space or tab continues the previous
/// logical line; exactly one leading whitespace character is removed.
pub fn unfold_lines(feed_text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for physical in feed_text.split("\r\n").flat_map(|l| l.split(['\n', '\r'])) {
        match physical.strip_prefix([' ', '\t']) {
            Some(continuation) => match lines.last_mut() {
                Some(current) => current.push_str(continuation),
                // Nothing to continue yet
                None => lines.push(continuation.to_string()),
            },
            None => lines.push(physical.to_string()),
        }
    }

    lines
}

/// Split a logical line on its first colon.
///
/// Lines without a colon yield `None`.
pub fn split_content_line(line: &str) -> Option<ContentLine<'_>> {
    let (key_part, value) = line.split_once(':')?;
    let name = key_part
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_uppercase();

    Some(ContentLine { name, value })
}

/// Reverse iCalendar TEXT escaping
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Fields of the event under construction
#[derive(Debug, Default)]
struct EventDraft {
    uid: Option<String>,
    title: String,
    description: String,
    location: String,
    url: String,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    all_day: bool,
    /// Depth of nested components such as VALARM
    nested: usize,
}

impl EventDraft {
    fn set_field(&mut self, name: &str, value: &str, tz: &Tz) {
        match name {
            "UID" => {
                let uid = value.trim();
                if !uid.is_empty() {
                    self.uid = Some(uid.to_string());
                }
            }
            "SUMMARY" => self.title = unescape_text(value),
            "DESCRIPTION" => self.description = unescape_text(value),
            "LOCATION" => self.location = unescape_text(value),
            "URL" => self.url = unescape_text(value.trim()),
            "DTSTART" => {
                let decoded = decode_token(value, tz);
                self.start = decoded.map(|d| d.instant);
                self.all_day = decoded.is_some_and(|d| d.all_day);
            }
            "DTEND" => self.end = decode_token(value, tz).map(|d| d.instant),
            _ => {}
        }
    }

    /// Finish the draft; events without a start are dropped
    fn finish(self, index: usize) -> Option<CalendarEvent> {
        let start = self.start?;
        let id = self
            .uid
            .unwrap_or_else(|| synthesize_id(index, start, &self.title));

        Some(CalendarEvent {
            id,
            title: self.title,
            description: self.description,
            location: self.location,
            url: self.url,
            start: Some(start),
            end: self.end,
            all_day: self.all_day,
        })
    }
}

/// Deterministic id for events without a UID
fn synthesize_id(index: usize, start: DateTime<Utc>, title: &str) -> String {
    let name = format!("{}|{}|{}", index, start.to_rfc3339(), title);
    let hash = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).simple().to_string();
    format!("{}-{}", start.timestamp_millis(), &hash[..8])
}

#[derive(Debug, Default)]
struct DecodeState {
    current: Option<EventDraft>,
    events: Vec<CalendarEvent>,
    /// VEVENT blocks seen so far, used for id synthesis
    seen: usize,
    dropped: usize,
}

impl DecodeState {
    fn apply(mut self, line: &ContentLine<'_>, tz: &Tz) -> Self {
        let is_vevent = line.value.trim().eq_ignore_ascii_case("VEVENT");

        match (line.name.as_str(), is_vevent) {
            ("BEGIN", true) => {
                if self.current.take().is_some() {
                    // Unterminated block
                    self.dropped += 1;
                }
                self.current = Some(EventDraft::default());
                self.seen += 1;
            }
            ("END", true) => {
                if let Some(draft) = self.current.take() {
                    match draft.finish(self.seen - 1) {
                        Some(event) => self.events.push(event),
                        None => self.dropped += 1,
                    }
                }
            }
            ("BEGIN", false) => {
                if let Some(draft) = self.current.as_mut() {
                    draft.nested += 1;
                }
            }
            ("END", false) => {
                if let Some(draft) = self.current.as_mut() {
                    draft.nested = draft.nested.saturating_sub(1);
                }
            }
            (name, _) => {
                if let Some(draft) = self.current.as_mut().filter(|d| d.nested == 0) {
                    draft.set_field(name, line.value, tz);
                }
            }
        }

        self
    }
}
