//! File-backed library store
//!
//! One pretty-printed JSON [`UserDocument`] per user at
//! `<data_dir>/<sanitized username>.json`. Every mutation reads the whole
//! document, changes it and writes it back under a single writer lock;
//! last write wins against anything outside this process.

use shelf_domain::{
    sanitize_username, Book, BookPatch, Collection, NewBook, UserDocument, UserMetadata,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::error::StoreError;

const DOCUMENT_EXTENSION: &str = "json";

/// Per-user JSON document store
pub struct LibraryStore {
    data_dir: PathBuf,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl LibraryStore {
    pub fn new(data_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            data_dir: data_dir.into(),
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Create the data directory if needed
    pub async fn init(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        tracing::info!("Library store at {:?}", self.data_dir);
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", key, DOCUMENT_EXTENSION))
    }

    async fn read_document(&self, key: &str) -> Result<Option<UserDocument>, StoreError> {
        let path = self.document_path(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, key: &str, document: &UserDocument) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.document_path(key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(document)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(
            user = key,
            books = document.books.len(),
            collections = document.collections.len(),
            "Saved user document"
        );
        Ok(())
    }

    /// Read-modify-write one user's document under the writer lock. A
    /// missing document is created with default metadata.
    async fn mutate<T, F>(&self, username: &str, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut UserDocument) -> Result<T, StoreError> + Send,
        T: Send,
    {
        let key = sanitize_username(username)?;
        let _guard = self.write_lock.lock().await;
        let mut document = self
            .read_document(&key)
            .await?
            .unwrap_or_else(|| UserDocument::new(key.clone(), None));
        let out = f(&mut document)?;
        self.write_document(&key, &document).await?;
        Ok(out)
    }

    // ===== Users =====

    /// Metadata of every stored user, sorted by username
    pub async fn list_users(&self) -> Result<Vec<UserMetadata>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut users = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.read_document(key).await {
                Ok(Some(document)) => users.push(document.metadata),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping unreadable user document {:?}: {}", path, e),
            }
        }
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    /// Create a user document. Creating an existing user returns its
    /// current metadata unchanged.
    pub async fn create_user(&self, username: &str, icon: Option<String>) -> Result<UserMetadata, StoreError> {
        let key = sanitize_username(username)?;
        let _guard = self.write_lock.lock().await;
        if let Some(existing) = self.read_document(&key).await? {
            return Ok(existing.metadata);
        }
        let document = UserDocument::new(key.clone(), icon);
        self.write_document(&key, &document).await?;
        tracing::info!(user = %key, "Created user");
        Ok(document.metadata)
    }

    /// The full document of an existing user
    pub async fn get_user(&self, username: &str) -> Result<UserDocument, StoreError> {
        let key = sanitize_username(username)?;
        self.read_document(&key)
            .await?
            .ok_or(StoreError::UserNotFound(key))
    }

    pub async fn update_user_icon(&self, username: &str, icon: &str) -> Result<UserMetadata, StoreError> {
        let icon = icon.trim().to_string();
        self.mutate(username, move |doc| {
            if !icon.is_empty() {
                doc.metadata.icon = icon;
            }
            Ok(doc.metadata.clone())
        })
        .await
    }

    /// A user's document, or an empty one if the user has never written
    async fn document_or_empty(&self, username: &str) -> Result<UserDocument, StoreError> {
        let key = sanitize_username(username)?;
        Ok(self
            .read_document(&key)
            .await?
            .unwrap_or_else(|| UserDocument::new(key, None)))
    }

    // ===== Books =====

    pub async fn list_books(&self, username: &str) -> Result<Vec<Book>, StoreError> {
        Ok(self.document_or_empty(username).await?.books)
    }

    /// Validate and append a book; the store assigns its id and added date
    pub async fn create_book(&self, username: &str, new: NewBook) -> Result<Book, StoreError> {
        let new = new.validated()?;
        let book = Book::from_new(new, uuid::Uuid::new_v4().to_string(), self.clock.now());
        self.mutate(username, |doc| {
            doc.books.push(book.clone());
            Ok(book)
        })
        .await
    }

    pub async fn update_book(&self, username: &str, id: &str, patch: BookPatch) -> Result<Book, StoreError> {
        self.mutate(username, |doc| {
            let book = doc
                .book_mut(id)
                .ok_or_else(|| StoreError::BookNotFound(id.to_string()))?;
            book.apply_patch(patch)?;
            Ok(book.clone())
        })
        .await
    }

    /// Remove a book. Collections keep the id.
    pub async fn delete_book(&self, username: &str, id: &str) -> Result<(), StoreError> {
        self.mutate(username, |doc| {
            let before = doc.books.len();
            doc.books.retain(|b| b.id != id);
            if doc.books.len() == before {
                return Err(StoreError::BookNotFound(id.to_string()));
            }
            Ok(())
        })
        .await
    }

    // ===== Collections =====

    pub async fn list_collections(&self, username: &str) -> Result<Vec<Collection>, StoreError> {
        Ok(self.document_or_empty(username).await?.collections)
    }

    pub async fn create_collection(&self, username: &str, name: &str) -> Result<Collection, StoreError> {
        let collection = Collection::new(name, self.clock.now())?;
        self.mutate(username, |doc| {
            doc.collections.push(collection.clone());
            Ok(collection)
        })
        .await
    }

    pub async fn rename_collection(&self, username: &str, id: &str, name: &str) -> Result<Collection, StoreError> {
        self.mutate(username, |doc| {
            let collection = doc
                .collection_mut(id)
                .ok_or_else(|| StoreError::CollectionNotFound(id.to_string()))?;
            collection.rename(name)?;
            Ok(collection.clone())
        })
        .await
    }

    pub async fn delete_collection(&self, username: &str, id: &str) -> Result<(), StoreError> {
        self.mutate(username, |doc| {
            let before = doc.collections.len();
            doc.collections.retain(|c| c.id != id);
            if doc.collections.len() == before {
                return Err(StoreError::CollectionNotFound(id.to_string()));
            }
            Ok(())
        })
        .await
    }

    /// Append a book to a collection. The book must exist; adding it twice
    /// is `AlreadyInCollection`.
    pub async fn add_book_to_collection(
        &self,
        username: &str,
        collection_id: &str,
        book_id: &str,
    ) -> Result<Collection, StoreError> {
        self.mutate(username, |doc| {
            if doc.book(book_id).is_none() {
                return Err(StoreError::BookNotFound(book_id.to_string()));
            }
            let collection = doc
                .collection_mut(collection_id)
                .ok_or_else(|| StoreError::CollectionNotFound(collection_id.to_string()))?;
            if !collection.add_book(book_id) {
                return Err(StoreError::AlreadyInCollection {
                    collection: collection_id.to_string(),
                    book: book_id.to_string(),
                });
            }
            Ok(collection.clone())
        })
        .await
    }

    pub async fn remove_book_from_collection(
        &self,
        username: &str,
        collection_id: &str,
        book_id: &str,
    ) -> Result<Collection, StoreError> {
        self.mutate(username, |doc| {
            let collection = doc
                .collection_mut(collection_id)
                .ok_or_else(|| StoreError::CollectionNotFound(collection_id.to_string()))?;
            if !collection.remove_book(book_id) {
                return Err(StoreError::NotInCollection {
                    collection: collection_id.to_string(),
                    book: book_id.to_string(),
                });
            }
            Ok(collection.clone())
        })
        .await
    }

    /// Books of a collection in collection order, dangling ids dropped
    pub async fn collection_books(&self, username: &str, collection_id: &str) -> Result<Vec<Book>, StoreError> {
        let document = self.document_or_empty(username).await?;
        let collection = document
            .collections
            .iter()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| StoreError::CollectionNotFound(collection_id.to_string()))?;
        Ok(collection
            .resolve(&document.books)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn store() -> (LibraryStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        (LibraryStore::new(dir.path().join("users"), Arc::new(clock)), dir)
    }

    #[tokio::test]
    async fn test_create_user_is_idempotent() {
        let (store, _dir) = store();
        store.init().await.unwrap();
        let first = store.create_user("alice", Some("🦊".to_string())).await.unwrap();
        let again = store.create_user("alice", None).await.unwrap();
        assert_eq!(first, again);
        assert_eq!(again.icon, "🦊");

        store.create_user("bob", None).await.unwrap();
        let names: Vec<String> = store.list_users().await.unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (store, _dir) = store();
        assert!(matches!(store.get_user("nobody").await, Err(StoreError::UserNotFound(_))));
        assert!(store.list_books("nobody").await.unwrap().is_empty());
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_username() {
        let (store, _dir) = store();
        assert!(matches!(store.create_user("../..", None).await, Err(StoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_book_lifecycle() {
        let (store, _dir) = store();
        let book = store.create_book("alice", NewBook::new(" Dune ", "Frank Herbert")).await.unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.added_date, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

        // Writing for a new user creates the document
        assert_eq!(store.get_user("alice").await.unwrap().books.len(), 1);

        let patch: BookPatch = serde_json::from_str(r#"{"notes":"great","status":"finished"}"#).unwrap();
        let updated = store.update_book("alice", &book.id, patch).await.unwrap();
        assert_eq!(updated.notes.as_deref(), Some("great"));
        assert_eq!(updated.status, shelf_domain::ReadingStatus::Finished);

        store.delete_book("alice", &book.id).await.unwrap();
        assert!(store.list_books("alice").await.unwrap().is_empty());
        assert!(matches!(
            store.delete_book("alice", &book.id).await,
            Err(StoreError::BookNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_book_requires_title_and_author() {
        let (store, _dir) = store();
        let err = store.create_book("alice", NewBook::new("Dune", "  ")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(matches!(store.get_user("alice").await, Err(StoreError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_collection_membership() {
        let (store, _dir) = store();
        let book = store.create_book("alice", NewBook::new("Dune", "Frank Herbert")).await.unwrap();
        let collection = store.create_collection("alice", "Sci-Fi").await.unwrap();

        let updated = store.add_book_to_collection("alice", &collection.id, &book.id).await.unwrap();
        assert_eq!(updated.book_ids, vec![book.id.clone()]);
        assert!(matches!(
            store.add_book_to_collection("alice", &collection.id, &book.id).await,
            Err(StoreError::AlreadyInCollection { .. })
        ));
        assert!(matches!(
            store.add_book_to_collection("alice", &collection.id, "missing").await,
            Err(StoreError::BookNotFound(_))
        ));

        let books = store.collection_books("alice", &collection.id).await.unwrap();
        assert_eq!(books.len(), 1);

        // Deleting the book leaves a dangling id that resolution drops
        store.delete_book("alice", &book.id).await.unwrap();
        assert!(store.collection_books("alice", &collection.id).await.unwrap().is_empty());
        assert_eq!(store.list_collections("alice").await.unwrap()[0].book_ids.len(), 1);

        store.remove_book_from_collection("alice", &collection.id, &book.id).await.unwrap();
        assert!(matches!(
            store.remove_book_from_collection("alice", &collection.id, &book.id).await,
            Err(StoreError::NotInCollection { .. })
        ));
    }

    #[tokio::test]
    async fn test_rename_and_delete_collection() {
        let (store, _dir) = store();
        let collection = store.create_collection("alice", "Old").await.unwrap();
        let renamed = store.rename_collection("alice", &collection.id, "New").await.unwrap();
        assert_eq!(renamed.name, "New");
        assert!(matches!(
            store.rename_collection("alice", &collection.id, " ").await,
            Err(StoreError::Validation(_))
        ));

        store.delete_collection("alice", &collection.id).await.unwrap();
        assert!(matches!(
            store.delete_collection("alice", &collection.id).await,
            Err(StoreError::CollectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let (store, dir) = store();
        store.create_user("alice", None).await.unwrap();
        store.update_user_icon("alice", "🐢").await.unwrap();
        store.create_book("alice", NewBook::new("Emma", "Jane Austen")).await.unwrap();

        let reopened = LibraryStore::new(dir.path().join("users"), Arc::new(crate::clock::SystemClock));
        let doc = reopened.get_user("alice").await.unwrap();
        assert_eq!(doc.metadata.icon, "🐢");
        assert_eq!(doc.books[0].title, "Emma");
        assert!(dir.path().join("users").join("alice.json").exists());
    }
}
