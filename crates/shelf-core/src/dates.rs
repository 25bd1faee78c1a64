//! Date normalization
//!
//! Turns heterogeneous date text into a canonical UTC instant. Slash dates
//! are read day-first (`31/01/2024`) and only fall back to month-first
//! (`01/31/2024`) when the day-first reading is not a real calendar date.
//! Impossible dates (`31/04/2024`) are never clamped; they yield `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SLASH_DATE: Regex = Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap();
    static ref ISO_DATE: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap();
}

/// Formats accepted by the last-resort parse, tried in order
const GENERIC_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];
const GENERIC_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// A value that may already be an instant or may still be text
#[derive(Debug, Clone, Copy)]
pub enum DateInput<'a> {
    Instant(DateTime<Utc>),
    Text(&'a str),
}

/// Normalize either form to an instant, `None` meaning "no date"
pub fn normalize_date(input: DateInput<'_>) -> Option<DateTime<Utc>> {
    match input {
        DateInput::Instant(instant) => Some(instant),
        DateInput::Text(text) => parse_date_text(text),
    }
}

/// Parse date text in precedence order: `D/M/YYYY`, `YYYY-MM-DD`,
/// `M/D/YYYY`, then a generic parse. Blank or unparsable text is `None`.
pub fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let slash = SLASH_DATE.captures(text).and_then(|caps| {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        Some((first, second, year))
    });

    // Day-first
    if let Some((day, month, year)) = slash {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(start_of_day(date));
        }
    }

    // Strict ISO
    if let Some(caps) = ISO_DATE.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day).map(start_of_day);
    }

    // Month-first, only reached when day-first was not a real date
    if let Some((month, day, year)) = slash {
        return NaiveDate::from_ymd_opt(year, month, day).map(start_of_day);
    }

    parse_generic(text)
}

fn parse_generic(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in GENERIC_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in GENERIC_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(start_of_day(date));
        }
    }
    None
}

/// `YYYY-MM-DD`
pub fn format_date(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}

/// Sortable `YYYY-MM` bucket key
pub fn month_key(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m").to_string()
}

/// Display label for a month, e.g. `March 2024`
pub fn month_label(instant: &DateTime<Utc>) -> String {
    instant.format("%B %Y").to_string()
}

/// Midnight UTC at the start of `date`
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// The last millisecond of `date`
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .map(|last| Utc.from_utc_datetime(&last))
        .unwrap_or_else(|| start_of_day(date))
}

/// `[Jan 1 00:00, Dec 31 23:59:59.999]` of `year`
pub fn year_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let last = NaiveDate::from_ymd_opt(year, 12, 31)?;
    Some((start_of_day(first), end_of_day(last)))
}
