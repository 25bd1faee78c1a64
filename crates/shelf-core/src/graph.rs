//! Gantt-style reading graph layout
//!
//! One horizontal bar per book on a shared time axis, in the order the books
//! are given (no packing). The time domain is the span of all bar endpoints
//! padded by 10% on each side.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shelf_domain::{Book, ReadingStatus};

use crate::dates::format_date;
use crate::interval::{duration_days, effective_end};

/// Fraction of the total span added before the first and after the last endpoint
const DOMAIN_PADDING: f64 = 0.1;

/// Pixel geometry for the graph
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Width of the time axis in pixels
    pub width: f64,
    /// Vertical space per book
    pub row_height: f64,
    /// Bar thickness, centered in its row
    pub bar_height: f64,
    /// Space between a bar's end and its label
    pub label_gap: f64,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            width: 960.0,
            row_height: 28.0,
            bar_height: 18.0,
            label_gap: 6.0,
        }
    }
}

/// Hover details for a bar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphTooltip {
    pub title: String,
    pub author: String,
    pub start: String,
    pub end: String,
    pub duration_days: i64,
}

/// One laid-out bar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphBar {
    pub book_id: String,
    pub row: usize,
    pub status: ReadingStatus,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: &'static str,
    pub label: String,
    pub label_x: f64,
    pub label_y: f64,
    pub tooltip: GraphTooltip,
}

/// The full chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayout {
    pub domain_start: DateTime<Utc>,
    pub domain_end: DateTime<Utc>,
    pub width: f64,
    pub height: f64,
    pub bars: Vec<GraphBar>,
}

/// Fixed bar color per status
pub fn status_color(status: ReadingStatus) -> &'static str {
    match status {
        ReadingStatus::ToRead => "#9ca3af",
        ReadingStatus::Reading => "#3b82f6",
        ReadingStatus::Finished => "#22c55e",
        ReadingStatus::OnHold => "#f59e0b",
        ReadingStatus::Abandoned => "#ef4444",
    }
}

/// Lay out `books` in the given order. Books without a start date are
/// skipped; `None` when nothing is left to draw.
pub fn layout_graph(books: &[&Book], now: DateTime<Utc>, options: &GraphOptions) -> Option<GraphLayout> {
    let intervals: Vec<(&Book, DateTime<Utc>, DateTime<Utc>)> = books
        .iter()
        .filter_map(|b| {
            let start = b.reading_start_date?;
            let end = effective_end(b, now)?;
            Some((*b, start, end))
        })
        .collect();

    let min = intervals.iter().flat_map(|(_, s, e)| [*s, *e]).min()?;
    let max = intervals.iter().flat_map(|(_, s, e)| [*s, *e]).max()?;

    let span = max - min;
    let padding = if span == Duration::zero() {
        Duration::days(1)
    } else {
        Duration::milliseconds((span.num_milliseconds() as f64 * DOMAIN_PADDING) as i64)
    };
    // Padding stops at the ends of the calendar
    let domain_start = min.checked_sub_signed(padding).unwrap_or(min);
    let domain_end = max.checked_add_signed(padding).unwrap_or(max);
    let domain_millis = (domain_end - domain_start).num_milliseconds() as f64;
    let scale = |t: DateTime<Utc>| (t - domain_start).num_milliseconds() as f64 / domain_millis * options.width;

    let bar_offset = (options.row_height - options.bar_height) / 2.0;
    let bars = intervals
        .into_iter()
        .enumerate()
        .map(|(row, (book, start, end))| {
            let (x0, x1) = (scale(start), scale(end));
            let x = x0.min(x1);
            let width = (x1 - x0).abs();
            let y = row as f64 * options.row_height + bar_offset;
            GraphBar {
                book_id: book.id.clone(),
                row,
                status: book.status,
                start,
                end,
                x,
                y,
                width,
                height: options.bar_height,
                color: status_color(book.status),
                label: book.title.clone(),
                label_x: x + width + options.label_gap,
                label_y: y + options.bar_height / 2.0,
                tooltip: GraphTooltip {
                    title: book.title.clone(),
                    author: book.author.clone(),
                    start: format_date(&start),
                    end: format_date(&end),
                    duration_days: duration_days(start, end),
                },
            }
        })
        .collect::<Vec<_>>();

    Some(GraphLayout {
        domain_start,
        domain_end,
        width: options.width,
        height: bars.len() as f64 * options.row_height,
        bars,
    })
}
