//! Validation shared by every write path

use thiserror::Error;

/// A rejected write, reported before anything is persisted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title or author missing after trimming
    #[error("Title and Author are required")]
    MissingTitleOrAuthor,

    /// Collection name missing after trimming
    #[error("Collection name is required")]
    EmptyCollectionName,

    /// Username contains no usable characters
    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),
}

/// Trim title and author and reject either being empty
pub fn require_title_and_author(
    title: &str,
    author: &str,
) -> Result<(String, String), ValidationError> {
    let title = title.trim();
    let author = author.trim();
    if title.is_empty() || author.is_empty() {
        return Err(ValidationError::MissingTitleOrAuthor);
    }
    Ok((title.to_string(), author.to_string()))
}

/// Trim tags, drop empties and exact duplicates, keeping first-seen order
pub fn clean_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
