//! CSV export and tolerant CSV parsing against a fixed header schema.
//!
//! The header row is always, in this order:
//!
//! ```text
//! Title,Author,Status,Published Date,Reading Start Date,Reading End Date,Notes,Tags
//! ```
//!
//! On import, headers are matched case-insensitively and may appear in any
//! order or be partially absent; only Title and Author are mandatory.

use shelf_domain::{Book, NewBook, ValidationError};

use crate::dates::{format_date, parse_date_text};
use crate::error::{ImportError, Result};
use crate::normalize::{format_tags, parse_tags, status_or_default};

/// The exact header row, in export order
pub const CSV_HEADERS: [&str; 8] = [
    "Title",
    "Author",
    "Status",
    "Published Date",
    "Reading Start Date",
    "Reading End Date",
    "Notes",
    "Tags",
];

/// One column of the fixed schema
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CsvField {
    Title,
    Author,
    Status,
    PublishedDate,
    ReadingStartDate,
    ReadingEndDate,
    Notes,
    Tags,
}

impl CsvField {
    pub const ALL: [CsvField; 8] = [
        CsvField::Title,
        CsvField::Author,
        CsvField::Status,
        CsvField::PublishedDate,
        CsvField::ReadingStartDate,
        CsvField::ReadingEndDate,
        CsvField::Notes,
        CsvField::Tags,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            CsvField::Title => CSV_HEADERS[0],
            CsvField::Author => CSV_HEADERS[1],
            CsvField::Status => CSV_HEADERS[2],
            CsvField::PublishedDate => CSV_HEADERS[3],
            CsvField::ReadingStartDate => CSV_HEADERS[4],
            CsvField::ReadingEndDate => CSV_HEADERS[5],
            CsvField::Notes => CSV_HEADERS[6],
            CsvField::Tags => CSV_HEADERS[7],
        }
    }

    /// Case-insensitive header lookup. A leading byte-order mark is ignored.
    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim_start_matches('\u{feff}').trim();
        Self::ALL
            .into_iter()
            .find(|f| f.header().eq_ignore_ascii_case(header))
    }

    fn value(&self, book: &Book) -> String {
        match self {
            CsvField::Title => book.title.clone(),
            CsvField::Author => book.author.clone(),
            CsvField::Status => book.status.label().to_string(),
            CsvField::PublishedDate => book.published_date.as_ref().map(format_date).unwrap_or_default(),
            CsvField::ReadingStartDate => book.reading_start_date.as_ref().map(format_date).unwrap_or_default(),
            CsvField::ReadingEndDate => book.reading_end_date.as_ref().map(format_date).unwrap_or_default(),
            CsvField::Notes => book.notes.clone().unwrap_or_default(),
            CsvField::Tags => format_tags(&book.tags),
        }
    }

    /// Notes are kept verbatim unless blank; every other cell is trimmed
    fn apply(&self, book: &mut NewBook, cell: &str) {
        if *self == CsvField::Notes {
            book.notes = Some(cell.to_string()).filter(|n| !n.trim().is_empty());
            return;
        }
        let cell = cell.trim();
        match self {
            CsvField::Title => book.title = cell.to_string(),
            CsvField::Author => book.author = cell.to_string(),
            CsvField::Status => book.status = status_or_default(cell),
            CsvField::PublishedDate => book.published_date = parse_date_text(cell),
            CsvField::ReadingStartDate => book.reading_start_date = parse_date_text(cell),
            CsvField::ReadingEndDate => book.reading_end_date = parse_date_text(cell),
            CsvField::Notes => {}
            CsvField::Tags => book.tags = parse_tags(cell),
        }
    }
}

// ===== Export =====

/// Header row plus one row per book. Dates are `YYYY-MM-DD`, tags are
/// `;`-joined, and cells containing a comma, quote or newline are quoted.
pub fn export_csv(books: &[Book]) -> Result<String> {
    let mut writer = csv_writer();
    writer.write_record(CSV_HEADERS)?;
    for book in books {
        writer.write_record(CsvField::ALL.iter().map(|f| f.value(book)))?;
    }
    finish(writer)
}

/// Header row only, as a starting point for hand-written imports
pub fn export_template() -> Result<String> {
    let mut writer = csv_writer();
    writer.write_record(CSV_HEADERS)?;
    finish(writer)
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::ShelfError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| crate::ShelfError::Csv(e.to_string()))
}

// ===== Import =====

/// One parsed data row
#[derive(Clone, Debug, PartialEq)]
pub struct CsvRow {
    /// 1-based line number in the source text (the header is line 1)
    pub row: u64,
    /// The candidate record, or why this row alone was rejected
    pub book: std::result::Result<NewBook, ValidationError>,
}

/// Parsed CSV content
#[derive(Clone, Debug, PartialEq)]
pub struct CsvDocument {
    /// Recognized columns, in file order
    pub fields: Vec<CsvField>,
    pub rows: Vec<CsvRow>,
}

/// Parse CSV text into candidate records.
///
/// Quoted cells may contain commas, newlines and doubled (`""`) quotes.
/// Structural problems (no data rows, missing Title/Author headers) fail the
/// whole parse; a row with a blank title or author only fails that row.
/// Unparsable dates become absent and unknown statuses become `to-read`.
/// Cells are trimmed except Notes, which keep their whitespace.
pub fn parse_csv(text: &str) -> std::result::Result<CsvDocument, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Malformed(e.to_string()))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        records.push(record);
    }

    let mut records = records.into_iter();
    let header = records.next().ok_or(ImportError::Empty)?;
    let data: Vec<csv::StringRecord> = records.collect();
    if data.is_empty() {
        return Err(ImportError::NoDataRows);
    }

    let columns: Vec<Option<CsvField>> = header.iter().map(CsvField::from_header).collect();
    let missing: Vec<String> = [CsvField::Title, CsvField::Author]
        .into_iter()
        .filter(|required| !columns.contains(&Some(*required)))
        .map(|f| f.header().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingHeaders(missing));
    }

    let rows = data
        .iter()
        .enumerate()
        .map(|(index, record)| {
            // Header is row 1; fall back to ordinal position if the reader
            // did not track a line.
            let row = record
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 2);
            CsvRow {
                row,
                book: row_to_book(&columns, record),
            }
        })
        .collect();

    Ok(CsvDocument {
        fields: columns.into_iter().flatten().collect(),
        rows,
    })
}

fn row_to_book(
    columns: &[Option<CsvField>],
    record: &csv::StringRecord,
) -> std::result::Result<NewBook, ValidationError> {
    let mut book = NewBook::default();
    for (index, field) in columns.iter().enumerate() {
        if let Some(field) = field {
            field.apply(&mut book, record.get(index).unwrap_or(""));
        }
    }
    book.validated()
}
