//! Shelf Core - derived views and CSV pipeline for a reading list
//!
//! This crate turns a flat list of [`Book`] records into the views a reading
//! tracker shows, and moves books in and out of CSV:
//!
//! - **Dates**: Tolerant date parsing (day-first, ISO, month-first, generic)
//! - **Normalize**: Free-text status synonyms and `;`-separated tags
//! - **CSV**: Export with a fixed header row, tolerant parsing on import
//! - **Import**: Sequential, deduplicating import through an injected writer
//! - **Timeline**: Books grouped into month buckets, most recent first
//! - **Filter / Sort**: Year, date-range, status, tag and text filters with
//!   null-last column sorting
//! - **Graph**: Time-scaled interval bars, one row per book
//! - **Store**: One JSON document per user on disk
//!
//! All view computation is synchronous and pure over a snapshot of books;
//! "now" always comes from an injected [`Clock`].

pub mod clock;
pub mod config;
pub mod csv_codec;
pub mod dates;
pub mod error;
pub mod filter;
pub mod graph;
pub mod import;
pub mod interval;
pub mod normalize;
pub mod sort;
pub mod store;
pub mod timeline;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, LoggingConfig, ServerConfig, ShelfConfig, StorageConfig};
pub use csv_codec::{export_csv, export_template, parse_csv, CsvDocument, CsvField, CsvRow, CSV_HEADERS};
pub use dates::{format_date, normalize_date, parse_date_text, DateInput};
pub use error::{ImportError, Result, ShelfError, StoreError};
pub use filter::{available_years, all_tags, ActiveFilter, DateRange, FilterKind, FilterSet, PeriodFilter};
pub use graph::{layout_graph, status_color, GraphBar, GraphLayout, GraphOptions, GraphTooltip};
pub use import::{import_csv, import_rows, ImportReport};
pub use interval::{duration_days, effective_end, reading_interval};
pub use normalize::{format_tags, normalize_status, parse_tags, status_or_default};
pub use sort::{sort_books, SortColumn, SortDirection, SortKey, SortState};
pub use store::LibraryStore;
pub use timeline::{build_timeline, TimelineGroup};

pub use shelf_domain::*;
