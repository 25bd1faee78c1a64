//! Table filters.
//!
//! Each predicate is toggled independently; a book must satisfy all active
//! ones. The year filter and the custom date-range filter share one slot, so
//! choosing either clears the other.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shelf_domain::{Book, ReadingStatus};
use std::collections::BTreeSet;

use crate::dates::{end_of_day, format_date, start_of_day, year_bounds};
use crate::interval::reading_interval;

/// A custom date range; an unset side is unbounded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Whole-day range: the end date is included up to its last millisecond
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start: start.map(start_of_day),
            end: end.map(end_of_day),
        }
    }

    /// Closed-interval overlap with `[start, end]`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let after_start = self.start.map_or(true, |range_start| end >= range_start);
        let before_end = self.end.map_or(true, |range_end| start <= range_end);
        after_start && before_end
    }

    fn label(&self) -> String {
        let side = |d: &Option<DateTime<Utc>>| d.as_ref().map(format_date).unwrap_or_else(|| "…".to_string());
        format!("{} – {}", side(&self.start), side(&self.end))
    }
}

/// The year-or-range slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum PeriodFilter {
    Year(i32),
    Range(DateRange),
}

/// Discriminant of an [`ActiveFilter`], used to remove one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    Year,
    DateRange,
    Title,
    Author,
    Search,
    Status,
    Tag,
}

/// One live filter with its display label
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ActiveFilter {
    Year { value: i32, label: String },
    DateRange { value: DateRange, label: String },
    Title { value: String, label: String },
    Author { value: String, label: String },
    Search { value: String, label: String },
    Status { value: ReadingStatus, label: String },
    Tag { value: String, label: String },
}

impl ActiveFilter {
    pub fn kind(&self) -> FilterKind {
        match self {
            ActiveFilter::Year { .. } => FilterKind::Year,
            ActiveFilter::DateRange { .. } => FilterKind::DateRange,
            ActiveFilter::Title { .. } => FilterKind::Title,
            ActiveFilter::Author { .. } => FilterKind::Author,
            ActiveFilter::Search { .. } => FilterKind::Search,
            ActiveFilter::Status { .. } => FilterKind::Status,
            ActiveFilter::Tag { .. } => FilterKind::Tag,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ActiveFilter::Year { label, .. }
            | ActiveFilter::DateRange { label, .. }
            | ActiveFilter::Title { label, .. }
            | ActiveFilter::Author { label, .. }
            | ActiveFilter::Search { label, .. }
            | ActiveFilter::Status { label, .. }
            | ActiveFilter::Tag { label, .. } => label,
        }
    }
}

/// The live filter state for the table and graph
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSet {
    title: Option<String>,
    author: Option<String>,
    search: Option<String>,
    status: Option<ReadingStatus>,
    tag: Option<String>,
    period: Option<PeriodFilter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a single year; clears any custom range
    pub fn set_year(&mut self, year: i32) -> &mut Self {
        self.period = Some(PeriodFilter::Year(year));
        self
    }

    /// Select a custom range; clears any year
    pub fn set_date_range(&mut self, range: DateRange) -> &mut Self {
        self.period = Some(PeriodFilter::Range(range));
        self
    }

    /// Case-insensitive substring on title. Blank text clears the filter.
    pub fn set_title(&mut self, text: &str) -> &mut Self {
        self.title = non_blank(text);
        self
    }

    /// Case-insensitive substring on author. Blank text clears the filter.
    pub fn set_author(&mut self, text: &str) -> &mut Self {
        self.author = non_blank(text);
        self
    }

    /// Case-insensitive substring on title or author
    pub fn set_search(&mut self, text: &str) -> &mut Self {
        self.search = non_blank(text);
        self
    }

    pub fn set_status(&mut self, status: ReadingStatus) -> &mut Self {
        self.status = Some(status);
        self
    }

    pub fn set_tag(&mut self, tag: &str) -> &mut Self {
        self.tag = non_blank(tag);
        self
    }

    pub fn year(&self) -> Option<i32> {
        match self.period {
            Some(PeriodFilter::Year(year)) => Some(year),
            _ => None,
        }
    }

    pub fn date_range(&self) -> Option<DateRange> {
        match self.period {
            Some(PeriodFilter::Range(range)) => Some(range),
            _ => None,
        }
    }

    /// Clear one filter
    pub fn remove(&mut self, kind: FilterKind) -> &mut Self {
        match kind {
            FilterKind::Year => {
                if self.year().is_some() {
                    self.period = None;
                }
            }
            FilterKind::DateRange => {
                if self.date_range().is_some() {
                    self.period = None;
                }
            }
            FilterKind::Title => self.title = None,
            FilterKind::Author => self.author = None,
            FilterKind::Search => self.search = None,
            FilterKind::Status => self.status = None,
            FilterKind::Tag => self.tag = None,
        }
        self
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Active filters with display labels, in a stable order
    pub fn active(&self) -> Vec<ActiveFilter> {
        let mut out = Vec::new();
        match self.period {
            Some(PeriodFilter::Year(value)) => out.push(ActiveFilter::Year {
                value,
                label: format!("Year: {}", value),
            }),
            Some(PeriodFilter::Range(value)) => out.push(ActiveFilter::DateRange {
                value,
                label: format!("Dates: {}", value.label()),
            }),
            None => {}
        }
        if let Some(value) = &self.title {
            out.push(ActiveFilter::Title {
                value: value.clone(),
                label: format!("Title: {}", value),
            });
        }
        if let Some(value) = &self.author {
            out.push(ActiveFilter::Author {
                value: value.clone(),
                label: format!("Author: {}", value),
            });
        }
        if let Some(value) = &self.search {
            out.push(ActiveFilter::Search {
                value: value.clone(),
                label: format!("Search: {}", value),
            });
        }
        if let Some(value) = self.status {
            out.push(ActiveFilter::Status {
                value,
                label: format!("Status: {}", value.display_name()),
            });
        }
        if let Some(value) = &self.tag {
            out.push(ActiveFilter::Tag {
                value: value.clone(),
                label: format!("Tag: {}", value),
            });
        }
        out
    }

    /// Whether `book` passes every active filter
    pub fn matches(&self, book: &Book, now: DateTime<Utc>) -> bool {
        if let Some(text) = &self.title {
            if !contains_ci(&book.title, text) {
                return false;
            }
        }
        if let Some(text) = &self.author {
            if !contains_ci(&book.author, text) {
                return false;
            }
        }
        if let Some(text) = &self.search {
            if !contains_ci(&book.title, text) && !contains_ci(&book.author, text) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if book.status != status {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !book.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        match self.period {
            Some(PeriodFilter::Year(year)) => matches_year(book, year, now),
            Some(PeriodFilter::Range(range)) => matches_range(book, &range, now),
            None => true,
        }
    }

    /// Books passing every active filter, input order preserved
    pub fn apply<'a>(&self, books: &'a [Book], now: DateTime<Utc>) -> Vec<&'a Book> {
        books.iter().filter(|b| self.matches(b, now)).collect()
    }
}

/// Whether the book's reading interval overlaps calendar year `year`
pub fn matches_year(book: &Book, year: i32, now: DateTime<Utc>) -> bool {
    let Some((year_start, year_end)) = year_bounds(year) else {
        return false;
    };
    matches_range(book, &DateRange::new(Some(year_start), Some(year_end)), now)
}

/// Whether the book's reading interval overlaps `range`. Books with neither
/// a start nor an end date never match.
pub fn matches_range(book: &Book, range: &DateRange, now: DateTime<Utc>) -> bool {
    match reading_interval(book, now) {
        Some((start, end)) => range.overlaps(start, end),
        None => false,
    }
}

/// Distinct years covered by any book's reading interval, newest first
pub fn available_years(books: &[Book], now: DateTime<Utc>) -> Vec<i32> {
    let mut years = BTreeSet::new();
    for (start, end) in books.iter().filter_map(|b| reading_interval(b, now)) {
        let (from, to) = if start <= end { (start, end) } else { (end, start) };
        years.extend(from.year()..=to.year());
    }
    years.into_iter().rev().collect()
}

/// Distinct tags across all books, sorted case-insensitively
pub fn all_tags(books: &[Book]) -> Vec<String> {
    let unique: BTreeSet<&str> = books
        .iter()
        .flat_map(|b| b.tags.iter().map(String::as_str))
        .collect();
    let mut tags: Vec<String> = unique.into_iter().map(str::to_string).collect();
    tags.sort_by_key(|t| t.to_lowercase());
    tags
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
