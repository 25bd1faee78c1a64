//! CSV export/import integration tests

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use shelf_core::{
    export_csv, export_template, import_csv, parse_csv, Book, ImportError, NewBook, ReadingStatus,
    CSV_HEADERS,
};

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn stored(new: NewBook, id: &str) -> Book {
    Book::from_new(new, id.to_string(), at(2024, 1, 1))
}

// === Export ===

#[test]
fn test_template_is_header_row_only() {
    let template = export_template().unwrap();
    assert_eq!(template, format!("{}\n", CSV_HEADERS.join(",")));
}

#[test]
fn test_export_quotes_only_where_needed() {
    let mut book = stored(
        NewBook::new("Hello, \"World\"", "Plain Author")
            .with_status(ReadingStatus::OnHold)
            .with_tags(["a", "b c"]),
        "1",
    );
    book.notes = Some("line one\nline two".to_string());
    book.reading_start_date = Some(at(2024, 2, 3));

    let text = export_csv(&[book]).unwrap();
    let mut lines = text.splitn(2, '\n');
    assert_eq!(lines.next().unwrap(), CSV_HEADERS.join(","));
    assert_eq!(
        lines.next().unwrap(),
        "\"Hello, \"\"World\"\"\",Plain Author,on-hold,,2024-02-03,,\"line one\nline two\",a;b c\n"
    );
}

#[test]
fn test_note_whitespace_survives_export() {
    let mut book = stored(NewBook::new("Dune", "Frank Herbert"), "1");
    book.notes = Some("  indented note\n".to_string());
    let text = export_csv(&[book]).unwrap();
    let parsed = parse_csv(&text).unwrap().rows[0].book.clone().unwrap();
    assert_eq!(parsed.notes.as_deref(), Some("  indented note\n"));
}

// === Parsing ===

#[test]
fn test_headers_in_any_order_and_case() {
    let doc = parse_csv("tags,AUTHOR,title\nx;y,Jane Austen,Emma\n").unwrap();
    let book = doc.rows[0].book.clone().unwrap();
    assert_eq!(book.title, "Emma");
    assert_eq!(book.author, "Jane Austen");
    assert_eq!(book.tags, vec!["x", "y"]);
    assert_eq!(book.status, ReadingStatus::ToRead);
}

#[test]
fn test_lenient_cell_values() {
    let text = "Title,Author,Status,Reading Start Date,Reading End Date,Published Date\n\
                Dune,Frank Herbert,Currently Reading,31/01/2024,not a date,01/31/2024\n";
    let book = parse_csv(text).unwrap().rows[0].book.clone().unwrap();
    assert_eq!(book.status, ReadingStatus::Reading);
    assert_eq!(book.reading_start_date, Some(at(2024, 1, 31)));
    assert_eq!(book.reading_end_date, None);
    assert_eq!(book.published_date, Some(at(2024, 1, 31)));
}

#[test]
fn test_unknown_status_defaults_to_to_read() {
    let book = parse_csv("Title,Author,Status\nA,B,someday maybe\n").unwrap().rows[0]
        .book
        .clone()
        .unwrap();
    assert_eq!(book.status, ReadingStatus::ToRead);
}

#[test]
fn test_structural_errors() {
    assert_eq!(parse_csv("").unwrap_err(), ImportError::Empty);
    assert_eq!(parse_csv("Title,Author\n").unwrap_err(), ImportError::NoDataRows);
    assert_eq!(
        parse_csv("Notes\nsomething\n").unwrap_err(),
        ImportError::MissingHeaders(vec!["Title".to_string(), "Author".to_string()])
    );
    assert_eq!(
        ImportError::MissingHeaders(vec!["Title".to_string(), "Author".to_string()]).to_string(),
        "Missing required headers: Title, Author"
    );
}

#[test]
fn test_blank_lines_are_ignored() {
    let doc = parse_csv("Title,Author\n\nA,B\n\n").unwrap();
    assert_eq!(doc.rows.len(), 1);
}

// === Import ===

#[tokio::test]
async fn test_import_of_exported_library_is_all_duplicates() {
    let library = vec![
        stored(NewBook::new("Dune", "Frank Herbert"), "1"),
        stored(NewBook::new("Emma", "Jane Austen"), "2"),
    ];
    let text = export_csv(&library).unwrap();
    let report = import_csv(&text, &library, |new: NewBook| async move {
        Ok::<_, String>(stored(new, "new"))
    })
    .await
    .unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors.iter().all(|e| e.contains("already exists")));
}

// === Properties ===

fn cell() -> impl Strategy<Value = String> {
    // Inner punctuation and newlines exercise quoting; titles and authors are
    // trimmed on import, so the outer letters keep the value stable
    "[A-Za-z0-9,\"' \n]{0,20}".prop_map(|inner| format!("a{}z", inner))
}

fn note() -> impl Strategy<Value = String> {
    // Surrounding whitespace is part of a note; only blank notes are dropped
    "[A-Za-z0-9,\"' \n]{1,24}".prop_filter("blank note", |n| !n.trim().is_empty())
}

fn date() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    proptest::option::of((1900i32..2100, 1u32..=12, 1u32..=28)).prop_map(|d| {
        d.and_then(|(y, m, day)| NaiveDate::from_ymd_opt(y, m, day))
            .map(|date| Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()))
    })
}

fn status() -> impl Strategy<Value = ReadingStatus> {
    proptest::sample::select(ReadingStatus::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_export_then_parse_preserves_fields(
        title in cell(),
        author in cell(),
        notes in proptest::option::of(note()),
        status in status(),
        start in date(),
        end in date(),
        published in date(),
        tags in proptest::collection::vec("[a-z]{1,8}", 0..4),
    ) {
        let mut book = stored(
            NewBook::new(title.clone(), author.clone())
                .with_status(status)
                .with_reading_dates(start, end)
                .with_tags(tags),
            "p",
        );
        book.notes = notes.clone();
        book.published_date = published;

        let text = export_csv(std::slice::from_ref(&book)).unwrap();
        let doc = parse_csv(&text).unwrap();
        prop_assert_eq!(doc.rows.len(), 1);
        let parsed = doc.rows[0].book.clone().unwrap();

        prop_assert_eq!(parsed.title, title);
        prop_assert_eq!(parsed.author, author);
        prop_assert_eq!(parsed.notes, notes);
        prop_assert_eq!(parsed.status, status);
        prop_assert_eq!(parsed.reading_start_date, start);
        prop_assert_eq!(parsed.reading_end_date, end);
        prop_assert_eq!(parsed.published_date, published);
        prop_assert_eq!(parsed.tags, book.tags);
    }
}
