//! Error types for shelf-core

use shelf_domain::ValidationError;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for shelf operations
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Main error type for shelf operations
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Rejected input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Structural CSV failure
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Persistence failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// CSV writer failure during export
    #[error("CSV error: {0}")]
    Csv(String),
}

/// Failures that abort a whole CSV import before any row is processed.
///
/// Row-level problems (missing title, duplicates, failed writes) are not
/// errors; they are reported in [`crate::ImportReport::errors`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// No content at all
    #[error("CSV file is empty")]
    Empty,

    /// A header row but nothing after it
    #[error("CSV must contain a header row and at least one data row")]
    NoDataRows,

    /// Title and/or Author column missing from the header row
    #[error("Missing required headers: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    /// The reader could not tokenize the input
    #[error("Malformed CSV: {0}")]
    Malformed(String),
}

/// Store-specific errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Book not found: {0}")]
    BookNotFound(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Book {book} is already in collection {collection}")]
    AlreadyInCollection { collection: String, book: String },

    #[error("Book {book} is not in collection {collection}")]
    NotInCollection { collection: String, book: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for ShelfError {
    fn from(err: csv::Error) -> Self {
        ShelfError::Csv(err.to_string())
    }
}
