use super::models::CalendarEvent;
use chrono::{
    DateTime, Datelike, Duration, LocalResult, Month, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use rust_i18n::t;

/// Feed token format for a date-only value
const DATE_FORMAT: &str = "%Y%m%d";
/// Feed token format for a date-time value without the zone marker
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Instant decoded from a feed date token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedToken {
    pub instant: DateTime<Utc>,
    /// The token carried no time of day
    pub all_day: bool,
}

/// Decode a `YYYYMMDD` or `YYYYMMDDTHHMMSS[Z]` token.
///
/// Date-only tokens resolve to local midnight in `tz`. Date-time tokens are
/// UTC when suffixed with `Z` and local otherwise. Anything else is `None`.
pub fn decode_token(token: &str, tz: &Tz) -> Option<DecodedToken> {
    let token = token.trim();

    if token.len() == 8 {
        if !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let date = NaiveDate::parse_from_str(token, DATE_FORMAT).ok()?;
        return Some(DecodedToken {
            instant: local_midnight(date, tz)?,
            all_day: true,
        });
    }

    if token.len() < 15 {
        return None;
    }

    let body = token.get(..15)?;
    let is_utc = match token.get(15..)? {
        "" => false,
        "Z" | "z" => true,
        _ => return None,
    };

    let naive = NaiveDateTime::parse_from_str(body, DATE_TIME_FORMAT).ok()?;
    let instant = if is_utc {
        naive.and_utc()
    } else {
        resolve_local(naive, tz)?
    };

    Some(DecodedToken {
        instant,
        all_day: false,
    })
}

/// Encode an instant as a feed token.
///
/// All-day values become the local `YYYYMMDD` date, everything else a UTC
/// `YYYYMMDDTHHMMSSZ` token.
pub fn encode_token(instant: DateTime<Utc>, all_day: bool, tz: &Tz) -> String {
    if all_day {
        local_date(instant, tz).format(DATE_FORMAT).to_string()
    } else {
        format!("{}Z", instant.format(DATE_TIME_FORMAT))
    }
}

/// Map a wall-clock time in `tz` to an instant.
///
/// Ambiguous times take the earlier instant; times inside a DST gap move
/// forward one hour.
pub fn resolve_local(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    let local = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest(),
    };
    local.map(|dt| dt.with_timezone(&Utc))
}

/// Instant of local midnight at the start of `date`
pub fn local_midnight(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    resolve_local(date.and_hms_opt(0, 0, 0)?, tz)
}

/// Calendar date of an instant in `tz`
pub fn local_date(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Parse a 12-hour clock time such as `7:30 PM` or `11:05am`
pub fn parse_clock_time(time_str: &str) -> Option<NaiveTime> {
    let upper = time_str.trim().to_ascii_uppercase();
    let (clock, is_pm) = if let Some(clock) = upper.strip_suffix("PM") {
        (clock, true)
    } else if let Some(clock) = upper.strip_suffix("AM") {
        (clock, false)
    } else {
        return None;
    };

    let (hour, minute) = clock.trim().split_once(':')?;
    let hour = hour.trim().parse::<u32>().ok()?;
    let minute = minute.trim().parse::<u32>().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }

    let hour = match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Long date in the active locale, `Monday, February 2, 2026` in English
pub fn format_date(date: NaiveDate) -> String {
    format_date_in(date, &rust_i18n::locale())
}

/// Long date in the given locale
pub fn format_date_in(date: NaiveDate, locale: &str) -> String {
    let month = u8::try_from(date.month())
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| month_name_in(m, locale))
        .unwrap_or_default();

    t!(
        "date_long",
        locale = locale,
        weekday = weekday_name_in(date.weekday(), locale),
        month = month,
        month_number = date.month(),
        day = date.day(),
        year = date.year()
    )
    .to_string()
}

/// Day and month without the year, `Feb 4` in English
pub fn format_short_date(date: NaiveDate) -> String {
    format_short_date_in(date, &rust_i18n::locale())
}

/// Day and month in the given locale
pub fn format_short_date_in(date: NaiveDate, locale: &str) -> String {
    let pattern = t!("date_short_pattern", locale = locale);
    date.format(&pattern).to_string()
}

/// Time of day in the active locale, `7:30 PM` in English
pub fn format_time(instant: DateTime<Utc>, tz: &Tz) -> String {
    format_time_in(instant, tz, &rust_i18n::locale())
}

/// Time of day in the given locale
pub fn format_time_in(instant: DateTime<Utc>, tz: &Tz, locale: &str) -> String {
    let pattern = t!("time_pattern", locale = locale);
    instant.with_timezone(tz).format(&pattern).to_string()
}

/// `7:30 PM` regardless of locale, as read by [`parse_clock_time`]
pub fn format_clock_time(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).format("%-I:%M %p").to_string()
}

/// Month name in the active locale
pub fn month_name(month: Month) -> String {
    month_name_in(month, &rust_i18n::locale())
}

/// Month name in the given locale
pub fn month_name_in(month: Month, locale: &str) -> String {
    match month {
        Month::January => t!("month_january", locale = locale),
        Month::February => t!("month_february", locale = locale),
        Month::March => t!("month_march", locale = locale),
        Month::April => t!("month_april", locale = locale),
        Month::May => t!("month_may", locale = locale),
        Month::June => t!("month_june", locale = locale),
        Month::July => t!("month_july", locale = locale),
        Month::August => t!("month_august", locale = locale),
        Month::September => t!("month_september", locale = locale),
        Month::October => t!("month_october", locale = locale),
        Month::November => t!("month_november", locale = locale),
        Month::December => t!("month_december", locale = locale),
    }
    .to_string()
}

fn weekday_name_in(weekday: Weekday, locale: &str) -> String {
    match weekday {
        Weekday::Mon => t!("weekday_monday", locale = locale),
        Weekday::Tue => t!("weekday_tuesday", locale = locale),
        Weekday::Wed => t!("weekday_wednesday", locale = locale),
        Weekday::Thu => t!("weekday_thursday", locale = locale),
        Weekday::Fri => t!("weekday_friday", locale = locale),
        Weekday::Sat => t!("weekday_saturday", locale = locale),
        Weekday::Sun => t!("weekday_sunday", locale = locale),
    }
    .to_string()
}

/// Human-readable description of when an event happens
pub fn format_event_when(event: &CalendarEvent, tz: &Tz) -> String {
    let Some(start) = event.start else {
        return t!("calendar_unknown_time").to_string();
    };
    let start_date = local_date(start, tz);

    if event.all_day {
        let end_date = event.inclusive_end_date(tz).unwrap_or(start_date);
        if end_date > start_date {
            return format!("{} – {}", format_date(start_date), format_date(end_date));
        }
        return format!("{} ({})", format_date(start_date), t!("calendar_all_day"));
    }

    match event.end {
        Some(end) if local_date(end, tz) == start_date => format!(
            "{}, {} – {}",
            format_date(start_date),
            format_time(start, tz),
            format_time(end, tz)
        ),
        Some(end) => format!(
            "{}, {} – {}, {}",
            format_date(start_date),
            format_time(start, tz),
            format_date(local_date(end, tz)),
            format_time(end, tz)
        ),
        None => format!("{}, {}", format_date(start_date), format_time(start, tz)),
    }
}
