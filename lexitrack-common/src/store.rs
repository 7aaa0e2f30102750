use chrono::Utc;
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::{Book, Database, NewBook, PersistenceError};

/// Name of the storage entry holding the whole library.
pub const STORAGE_KEY: &str = "lexiTrackBooks";

/// Outcome of a mutation. The in-memory change always stands; `warning` is set
/// when mirroring it to storage failed.
#[derive(Debug)]
#[must_use]
pub struct Persisted<T> {
    pub value: T,
    pub warning: Option<PersistenceError>,
}

impl<T> Persisted<T> {
    fn unchanged(value: T) -> Self {
        Self { value, warning: None }
    }
}

/// The single writer for the book collection. Books are kept newest first and
/// every change is written back to storage as one serialized entry.
pub struct BookStore {
    db: Database,
    books: Vec<Book>,
    // Set while the in-memory collection has changes storage has not seen.
    unsaved: bool,
}

impl BookStore {
    /// Loads the saved library. Missing data gives an empty library; unreadable
    /// data gives an empty library plus the reason as a warning.
    pub async fn load(db: Database) -> (Self, Option<PersistenceError>) {
        let (books, warning) = match Self::read_books(&db).await {
            Ok(books) => (books, None),
            Err(e) => {
                warn!("Failed to load books from storage: {}", e);
                (vec![], Some(e))
            }
        };

        info!("Loaded {} books", books.len());
        (
            Self {
                db,
                books,
                unsaved: false,
            },
            warning,
        )
    }

    async fn read_books(db: &Database) -> Result<Vec<Book>, PersistenceError> {
        let Some(raw) = db.read_entry(STORAGE_KEY).await.map_err(PersistenceError::Read)? else {
            debug!("No saved library found, starting empty");
            return Ok(vec![]);
        };

        serde_json::from_str(&raw).map_err(PersistenceError::Parse)
    }

    pub fn list(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub async fn create(&mut self, new: NewBook) -> Persisted<Book> {
        let book = Book::from_new(new, Utc::now());
        info!("Adding book {:?} ({})", book.title, book.id);

        self.books.insert(0, book.clone());
        let warning = self.persist().await;

        Persisted { value: book, warning }
    }

    /// Replaces the stored record with the same id. Returns whether one existed.
    pub async fn update(&mut self, book: Book) -> Persisted<bool> {
        let Some((index, _)) = self.books.iter().find_position(|b| b.id == book.id) else {
            debug!("Ignoring update for unknown book {}", book.id);
            return Persisted::unchanged(false);
        };

        info!("Updating book {:?} ({})", book.title, book.id);
        self.books[index] = book;
        let warning = self.persist().await;

        Persisted { value: true, warning }
    }

    /// Removes the record with this id, returning it. Unknown ids are a no-op.
    pub async fn delete(&mut self, id: &str) -> Persisted<Option<Book>> {
        let Some((index, _)) = self.books.iter().find_position(|b| b.id == id) else {
            debug!("Ignoring delete for unknown book {}", id);
            return Persisted::unchanged(None);
        };

        let removed = self.books.remove(index);
        info!("Deleted book {:?} ({})", removed.title, removed.id);
        let warning = self.persist().await;

        Persisted { value: Some(removed), warning }
    }

    async fn persist(&mut self) -> Option<PersistenceError> {
        let warning = self.save().await.err();
        self.unsaved = warning.is_some();
        warning
    }

    /// Writes the whole collection to storage.
    async fn save(&self) -> Result<(), PersistenceError> {
        let serialized = serde_json::to_string(&self.books).map_err(PersistenceError::Serialize)?;

        self.db
            .write_entry(STORAGE_KEY, &serialized)
            .await
            .map_err(PersistenceError::Write)
            .inspect_err(|e| warn!("Failed to save books to storage: {}", e))
    }

    /// Retries a failed write, if any, then releases the database. A session
    /// that changed nothing leaves the stored entry untouched.
    pub async fn close(self) -> Result<(), PersistenceError> {
        let result = if self.unsaved {
            debug!("Retrying save of unsaved changes before closing");
            self.save().await
        } else {
            Ok(())
        };

        self.db.close().await;
        result
    }
}
