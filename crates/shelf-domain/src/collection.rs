//! Collection representation for grouping books

use super::{Book, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, ordered view over existing books.
///
/// Deleting a book does not remove it from collections; dangling ids are
/// dropped by [`Collection::resolve`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub book_ids: Vec<String>,
    pub created_date: DateTime<Utc>,
}

impl Collection {
    /// Create a new empty collection
    pub fn new(name: &str, created_date: DateTime<Utc>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: Self::clean_name(name)?,
            book_ids: Vec::new(),
            created_date,
        })
    }

    pub fn rename(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = Self::clean_name(name)?;
        Ok(())
    }

    fn clean_name(name: &str) -> Result<String, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyCollectionName);
        }
        Ok(name.to_string())
    }

    pub fn contains(&self, book_id: &str) -> bool {
        self.book_ids.iter().any(|id| id == book_id)
    }

    /// Append a book id. Returns `false` if it was already present.
    pub fn add_book(&mut self, book_id: &str) -> bool {
        if self.contains(book_id) {
            return false;
        }
        self.book_ids.push(book_id.to_string());
        true
    }

    /// Remove a book id. Returns `false` if it was not present.
    pub fn remove_book(&mut self, book_id: &str) -> bool {
        let before = self.book_ids.len();
        self.book_ids.retain(|id| id != book_id);
        self.book_ids.len() != before
    }

    /// Books of this collection in collection order, skipping ids that no
    /// longer exist
    pub fn resolve<'a>(&self, books: &'a [Book]) -> Vec<&'a Book> {
        self.book_ids
            .iter()
            .filter_map(|id| books.iter().find(|b| &b.id == id))
            .collect()
    }
}
