//! Book domain model

use super::{clean_tags, require_title_and_author, Ownership, Rating, ReadingStatus, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A book on the reading list
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub status: ReadingStatus,

    /// Assigned by the store at creation, never changed afterwards
    pub added_date: DateTime<Utc>,

    // User-supplied dates
    #[serde(default)]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reading_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reading_end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// URL or embedded data URI
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub owned: Option<Ownership>,
}

impl Book {
    /// Materialize a validated record with store-assigned id and added date
    pub fn from_new(new: NewBook, id: String, added_date: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            author: new.author,
            status: new.status,
            added_date,
            published_date: new.published_date,
            reading_start_date: new.reading_start_date,
            reading_end_date: new.reading_end_date,
            notes: new.notes,
            tags: new.tags,
            image_url: new.image_url,
            rating: new.rating,
            owned: new.owned,
        }
    }

    /// Apply a partial update. Id and added date are immutable.
    pub fn apply_patch(&mut self, patch: BookPatch) -> Result<(), ValidationError> {
        let title = patch.title.as_deref().unwrap_or(&self.title);
        let author = patch.author.as_deref().unwrap_or(&self.author);
        let (title, author) = require_title_and_author(title, author)?;
        self.title = title;
        self.author = author;

        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(published) = patch.published_date {
            self.published_date = published;
        }
        if let Some(start) = patch.reading_start_date {
            self.reading_start_date = start;
        }
        if let Some(end) = patch.reading_end_date {
            self.reading_end_date = end;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes.filter(|n| !n.trim().is_empty());
        }
        if let Some(tags) = patch.tags {
            self.tags = clean_tags(tags);
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(owned) = patch.owned {
            self.owned = owned;
        }
        Ok(())
    }

    /// Duplicate-detection key: lowercased, trimmed `title|author`
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.title, &self.author)
    }
}

/// Lowercased, trimmed `title|author`
pub fn dedup_key(title: &str, author: &str) -> String {
    format!(
        "{}|{}",
        title.trim().to_lowercase(),
        author.trim().to_lowercase()
    )
}

/// A book as submitted for creation, before the store assigns id and added date
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub status: ReadingStatus,
    #[serde(default)]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reading_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reading_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub owned: Option<Ownership>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ReadingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_reading_dates(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.reading_start_date = start;
        self.reading_end_date = end;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = clean_tags(tags);
        self
    }

    /// Trim text fields and enforce the required title/author pair
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        let (title, author) = require_title_and_author(&self.title, &self.author)?;
        self.title = title;
        self.author = author;
        self.notes = self.notes.filter(|n| !n.trim().is_empty());
        self.tags = clean_tags(&self.tags);
        Ok(self)
    }

    pub fn dedup_key(&self) -> String {
        dedup_key(&self.title, &self.author)
    }
}

/// Partial update for a book.
///
/// For clearable fields the outer `Option` means "leave alone" and the inner
/// `None` means "clear"; in JSON an absent key leaves the field alone and an
/// explicit `null` clears it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<ReadingStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub published_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub reading_start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub reading_end_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    pub rating: Option<Rating>,
    #[serde(default, deserialize_with = "double_option")]
    pub owned: Option<Option<Ownership>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
