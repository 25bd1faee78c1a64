//! Per-user document: metadata plus every book and collection the user owns

use super::{Book, Collection, ValidationError};
use serde::{Deserialize, Serialize};

/// Icon assigned to users created without one
pub const DEFAULT_ICON: &str = "📚";

/// Display metadata for a user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    pub username: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

/// Everything one user owns, persisted as a single document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub metadata: UserMetadata,
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl UserDocument {
    /// Create an empty document. `username` is expected to be sanitized.
    pub fn new(username: impl Into<String>, icon: Option<String>) -> Self {
        let icon = icon
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .unwrap_or_else(default_icon);
        Self {
            metadata: UserMetadata {
                username: username.into(),
                icon,
            },
            books: Vec::new(),
            collections: Vec::new(),
        }
    }

    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn book_mut(&mut self, id: &str) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| b.id == id)
    }

    pub fn collection_mut(&mut self, id: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.id == id)
    }
}

/// Reduce a username to `[A-Za-z0-9_-]` so it can be used as a storage key
pub fn sanitize_username(raw: &str) -> Result<String, ValidationError> {
    let key: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if key.is_empty() {
        return Err(ValidationError::InvalidUsername(raw.to_string()));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice", "alice")]
    #[case("Bob_Smith-2", "Bob_Smith-2")]
    #[case("../etc/passwd", "etcpasswd")]
    #[case("  spaced name ", "spacedname")]
    #[case("zoë", "zo")]
    fn test_sanitize_username(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(sanitize_username(raw).unwrap(), expected);
    }

    #[test]
    fn test_sanitize_username_rejects_empty_key() {
        assert!(matches!(
            sanitize_username("../"),
            Err(ValidationError::InvalidUsername(_))
        ));
    }

    #[test]
    fn test_new_document_defaults() {
        let doc = UserDocument::new("alice", None);
        assert_eq!(doc.metadata.icon, DEFAULT_ICON);
        assert!(doc.books.is_empty());
        assert!(doc.collections.is_empty());

        let doc = UserDocument::new("bob", Some("🦊".to_string()));
        assert_eq!(doc.metadata.icon, "🦊");
    }

    #[test]
    fn test_document_tolerates_missing_sections() {
        let doc: UserDocument =
            serde_json::from_str(r#"{"metadata":{"username":"alice"}}"#).unwrap();
        assert_eq!(doc.metadata.icon, DEFAULT_ICON);
        assert!(doc.books.is_empty());
    }
}
