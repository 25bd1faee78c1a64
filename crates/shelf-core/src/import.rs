//! CSV import orchestration
//!
//! Rows are written one at a time through an injected `create` operation,
//! each write awaited before the next starts. A row is skipped when its
//! title+author key matches an existing book or a row already written in
//! this batch. Row failures are collected; they never stop the import.

use serde::Serialize;
use shelf_domain::{Book, NewBook};
use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;

use crate::csv_codec::{parse_csv, CsvRow};
use crate::error::ImportError;

/// Outcome of an import: how many rows were written, and why the rest were not
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub added: usize,
    /// One message per skipped or failed row, in row order
    pub errors: Vec<String>,
}

/// Parse `text` and import every row through `create`.
///
/// Only structural problems (empty file, no data rows, missing Title/Author
/// headers) return `Err`.
pub async fn import_csv<F, Fut, E>(
    text: &str,
    existing: &[Book],
    create: F,
) -> Result<ImportReport, ImportError>
where
    F: FnMut(NewBook) -> Fut,
    Fut: Future<Output = Result<Book, E>>,
    E: Display,
{
    let document = parse_csv(text)?;
    tracing::info!(rows = document.rows.len(), "Importing CSV");
    Ok(import_rows(document.rows, existing, create).await)
}

/// Import already-parsed rows through `create`, strictly sequentially
pub async fn import_rows<F, Fut, E>(rows: Vec<CsvRow>, existing: &[Book], mut create: F) -> ImportReport
where
    F: FnMut(NewBook) -> Fut,
    Fut: Future<Output = Result<Book, E>>,
    E: Display,
{
    let existing_keys: HashSet<String> = existing.iter().map(Book::dedup_key).collect();
    let mut accepted_keys: HashSet<String> = HashSet::new();
    let mut report = ImportReport::default();

    for CsvRow { row, book } in rows {
        let book = match book {
            Ok(book) => book,
            Err(e) => {
                report.errors.push(format!("row {}: {}", row, e));
                continue;
            }
        };

        let key = book.dedup_key();
        if existing_keys.contains(&key) || accepted_keys.contains(&key) {
            report.errors.push(format!(
                "row {}: \"{}\" by {} already exists",
                row, book.title, book.author
            ));
            continue;
        }

        let title = book.title.clone();
        match create(book).await {
            Ok(_) => {
                report.added += 1;
                accepted_keys.insert(key);
            }
            Err(e) => {
                tracing::warn!(row, error = %e, "Failed to import row");
                report
                    .errors
                    .push(format!("row {}: failed to add \"{}\": {}", row, title, e));
            }
        }
    }

    tracing::info!(
        added = report.added,
        skipped = report.errors.len(),
        "CSV import finished"
    );
    report
}
