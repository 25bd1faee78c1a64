//! Reading intervals: the concrete `[start, end]` span a book occupies.

use chrono::{DateTime, Duration, Utc};
use shelf_domain::{Book, ReadingStatus};

/// The end date used wherever an interval needs a concrete end.
///
/// The recorded end date if present; otherwise `now` for a book still being
/// read, or start + 1 day for anything else (the start itself at the end of
/// the calendar). `None` without a start date.
pub fn effective_end(book: &Book, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(end) = book.reading_end_date {
        return Some(end);
    }
    let start = book.reading_start_date?;
    if book.status == ReadingStatus::Reading {
        Some(now)
    } else {
        Some(start.checked_add_signed(Duration::days(1)).unwrap_or(start))
    }
}

/// `[start, effective end]`. A book with only an end date occupies that
/// single instant; a book with neither date has no interval.
pub fn reading_interval(book: &Book, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    match (book.reading_start_date, book.reading_end_date) {
        (Some(start), _) => effective_end(book, now).map(|end| (start, end)),
        (None, Some(end)) => Some((end, end)),
        (None, None) => None,
    }
}

/// Whole days between two instants, rounded up
pub fn duration_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds() as f64;
    (millis / 86_400_000.0).ceil() as i64
}
