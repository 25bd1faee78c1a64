//! Column sorting for the book table.
//!
//! Every column reduces a book to an optional, totally ordered [`SortKey`];
//! one comparator applies the direction. Missing keys always sort last, in
//! either direction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelf_domain::Book;
use std::cmp::Ordering;

/// Sortable table columns
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Title,
    Author,
    Status,
    Rating,
    Owned,
    PublishedDate,
    ReadingStartDate,
    ReadingEndDate,
    AddedDate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[serde(alias = "ascending")]
    Asc,
    #[serde(alias = "descending")]
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Active sort column and direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::ReadingStartDate,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Header click: the active column flips direction, a new column starts
    /// descending
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.reversed();
        } else {
            self.column = column;
            self.direction = SortDirection::Desc;
        }
    }
}

/// A comparable projection of one column
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortKey {
    Text(String),
    Date(DateTime<Utc>),
    Rank(u8),
}

/// Extract the key for `column`; `None` sorts last
pub fn sort_key(book: &Book, column: SortColumn) -> Option<SortKey> {
    match column {
        SortColumn::Title => Some(SortKey::Text(book.title.to_lowercase())),
        SortColumn::Author => surname(&book.author).map(SortKey::Text),
        SortColumn::Status => Some(SortKey::Text(book.status.label().to_string())),
        SortColumn::Rating => Some(SortKey::Rank(book.rating.priority())),
        SortColumn::Owned => book.owned.map(|o| SortKey::Text(o.label().to_string())),
        SortColumn::PublishedDate => book.published_date.map(SortKey::Date),
        SortColumn::ReadingStartDate => book.reading_start_date.map(SortKey::Date),
        SortColumn::ReadingEndDate => book.reading_end_date.map(SortKey::Date),
        SortColumn::AddedDate => Some(SortKey::Date(book.added_date)),
    }
}

/// Last whitespace-delimited token of the name, case-folded
fn surname(author: &str) -> Option<String> {
    author.split_whitespace().last().map(str::to_lowercase)
}

fn compare_keys(a: &Option<SortKey>, b: &Option<SortKey>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => direction.apply(a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by the active column
pub fn sort_books<'a>(books: &[&'a Book], state: SortState) -> Vec<&'a Book> {
    let mut keyed: Vec<(Option<SortKey>, &'a Book)> = books
        .iter()
        .map(|b| (sort_key(b, state.column), *b))
        .collect();
    keyed.sort_by(|a, b| compare_keys(&a.0, &b.0, state.direction));
    keyed.into_iter().map(|(_, b)| b).collect()
}
