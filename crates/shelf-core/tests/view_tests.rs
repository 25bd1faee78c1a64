//! Timeline, filter, sort and graph integration tests

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use shelf_core::{
    build_timeline, format_date, import_csv, layout_graph, parse_date_text, sort_books, Book,
    DateRange, FilterSet, FixedClock, GraphOptions, NewBook, ReadingStatus, SortColumn,
    SortDirection, SortState,
};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn book(
    id: &str,
    status: ReadingStatus,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Book {
    let new = NewBook::new(format!("Title {}", id), format!("Author {}", id))
        .with_status(status)
        .with_reading_dates(start, end);
    Book::from_new(new, id.to_string(), at(2020, 1, 1))
}

// === Scenarios ===

#[tokio::test]
async fn test_missing_title_row_three() {
    let report = import_csv(
        "Title,Author\nDune,Frank Herbert\n,NoTitle\n",
        &[],
        |new: NewBook| async move { Ok::<_, String>(Book::from_new(new, "1".to_string(), at(2024, 1, 1))) },
    )
    .await
    .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("row 3"));
    assert!(report.errors[0].contains("Title"));
}

#[test]
fn test_reading_book_without_end_matches_its_year_range() {
    let now = at(2025, 2, 1);
    let dune = book("dune", ReadingStatus::Reading, Some(at(2024, 3, 1)), None);
    let mut filters = FilterSet::new();
    filters.set_date_range(DateRange::from_dates(
        NaiveDate::from_ymd_opt(2024, 1, 1),
        NaiveDate::from_ymd_opt(2024, 12, 31),
    ));
    let books = [dune];
    assert_eq!(filters.apply(&books, now).len(), 1);
}

#[test]
fn test_impossible_day_first_date() {
    assert_eq!(parse_date_text("31/04/2024"), None);
}

#[test]
fn test_filtered_books_feed_sort_and_graph() {
    let now = at(2024, 12, 1);
    let books = vec![
        book("a", ReadingStatus::Finished, Some(at(2024, 1, 1)), Some(at(2024, 2, 1))),
        book("b", ReadingStatus::Finished, Some(at(2024, 5, 1)), Some(at(2024, 6, 1))),
        book("c", ReadingStatus::Finished, Some(at(2022, 5, 1)), Some(at(2022, 6, 1))),
        book("d", ReadingStatus::ToRead, None, None),
    ];
    let mut filters = FilterSet::new();
    filters.set_year(2024);
    let visible = filters.apply(&books, now);
    let sorted = sort_books(&visible, SortState::default());
    let ids: Vec<&str> = sorted.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);

    let layout = layout_graph(&sorted, now, &GraphOptions::default()).unwrap();
    assert_eq!(layout.bars.len(), 2);
    assert_eq!(layout.bars[0].book_id, "b");
    assert!(layout.bars[0].x > layout.bars[1].x);
}

// === Properties ===

fn day() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..3650).prop_map(|offset| at(2015, 1, 1) + Duration::days(offset))
}

proptest! {
    #[test]
    fn test_open_ended_books_land_in_most_recent_month(
        dated in proptest::collection::vec((day(), 0i64..200), 1..6),
        open_start in day(),
    ) {
        let mut books: Vec<Book> = dated
            .iter()
            .enumerate()
            .map(|(i, (start, len))| {
                book(&format!("d{}", i), ReadingStatus::Finished, Some(*start), Some(*start + Duration::days(*len)))
            })
            .collect();
        books.push(book("open", ReadingStatus::OnHold, Some(open_start), None));

        let latest = books
            .iter()
            .filter_map(|b| b.reading_end_date.or(b.reading_start_date))
            .max()
            .unwrap();
        let clock = FixedClock(at(2030, 1, 1));
        let groups = build_timeline(&books, &clock);
        let home = groups
            .iter()
            .find(|g| g.books.iter().any(|b| b.id == "open"))
            .unwrap();
        prop_assert_eq!(home.month_key.clone(), latest.format("%Y-%m").to_string());
        prop_assert_eq!(groups.iter().map(|g| g.books.len()).sum::<usize>(), books.len());
    }

    #[test]
    fn test_exported_dates_reparse(instant in day()) {
        let text = format_date(&instant);
        prop_assert_eq!(parse_date_text(&text), Some(instant));

        let day_first = instant.format("%d/%m/%Y").to_string();
        prop_assert_eq!(parse_date_text(&day_first), Some(instant));

        // Month-first only wins when the day cannot be a month
        if instant.day() > 12 {
            let month_first = instant.format("%m/%d/%Y").to_string();
            prop_assert_eq!(parse_date_text(&month_first), Some(instant));
        }
    }

    #[test]
    fn test_sort_reverse_is_exact_reverse(offsets in proptest::collection::btree_set(0i64..10_000, 1..12)) {
        // Distinct start dates, so no ties
        let books: Vec<Book> = offsets
            .iter()
            .enumerate()
            .map(|(i, o)| book(&i.to_string(), ReadingStatus::Finished, Some(at(2000, 1, 1) + Duration::days(*o)), None))
            .collect();
        let refs: Vec<&Book> = books.iter().collect();
        let asc = sort_books(&refs, SortState::new(SortColumn::ReadingStartDate, SortDirection::Asc));
        let mut desc = sort_books(&refs, SortState::new(SortColumn::ReadingStartDate, SortDirection::Desc));
        desc.reverse();
        prop_assert_eq!(asc, desc);
    }

    #[test]
    fn test_year_and_range_never_coexist(year in 1990i32..2030, set_year_last in any::<bool>()) {
        let mut filters = FilterSet::new();
        let range = DateRange::new(Some(at(2000, 1, 1)), None);
        if set_year_last {
            filters.set_date_range(range).set_year(year);
            prop_assert_eq!(filters.date_range(), None);
            prop_assert_eq!(filters.year(), Some(year));
        } else {
            filters.set_year(year).set_date_range(range);
            prop_assert_eq!(filters.year(), None);
            prop_assert_eq!(filters.date_range(), Some(range));
        }
    }
}

#[tokio::test]
async fn test_duplicate_rows_accept_first_in_either_order() {
    for text in [
        "Title,Author\nDune,Frank Herbert\n DUNE , frank herbert \n",
        "Title,Author\n DUNE , frank herbert \nDune,Frank Herbert\n",
    ] {
        let report = import_csv(text, &[], |new: NewBook| async move {
            Ok::<_, String>(Book::from_new(new, "x".to_string(), at(2024, 1, 1)))
        })
        .await
        .unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("already exists"));
    }
}
