//! Month-bucketed reading timeline.
//!
//! Only books with a reading start date appear. A book lands in the month of
//! its end date; a book without an end date lands in the most recent month
//! seen across all eligible books (end date preferred over start date per
//! book), or the current month when nothing has a date.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shelf_domain::Book;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::clock::Clock;
use crate::dates::{month_key, month_label};

/// One month of the timeline
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineGroup {
    /// `YYYY-MM`
    pub month_key: String,
    /// e.g. `March 2024`
    pub month_label: String,
    pub books: Vec<Book>,
}

/// Group books into month buckets, most recent month first
pub fn build_timeline(books: &[Book], clock: &dyn Clock) -> Vec<TimelineGroup> {
    let mut eligible: Vec<&Book> = books
        .iter()
        .filter(|b| b.reading_start_date.is_some())
        .collect();
    eligible.sort_by(|a, b| timeline_order(a, b));

    let latest: DateTime<Utc> = eligible
        .iter()
        .filter_map(|b| b.reading_end_date.or(b.reading_start_date))
        .max()
        .unwrap_or_else(|| clock.now());
    let fallback = (month_key(&latest), month_label(&latest));

    let mut buckets: BTreeMap<String, TimelineGroup> = BTreeMap::new();
    for book in eligible {
        let (key, label) = match &book.reading_end_date {
            Some(end) => (month_key(end), month_label(end)),
            None => fallback.clone(),
        };
        buckets
            .entry(key.clone())
            .or_insert_with(|| TimelineGroup {
                month_key: key,
                month_label: label,
                books: Vec::new(),
            })
            .books
            .push(book.clone());
    }

    buckets.into_values().rev().collect()
}

/// Start date descending; ties by end date descending, with a recorded end
/// sorting ahead of a missing one
fn timeline_order(a: &Book, b: &Book) -> Ordering {
    b.reading_start_date
        .cmp(&a.reading_start_date)
        .then_with(|| match (a.reading_end_date, b.reading_end_date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}
