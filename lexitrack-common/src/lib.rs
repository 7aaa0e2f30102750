pub mod db;
pub mod editor;
pub mod enhancement;
pub mod error;
pub mod form;
pub mod library;
pub mod store;

// Re-export commonly used types
pub use db::Database;
pub use editor::DetailEditor;
pub use enhancement::{EnhancementRequest, EnhancementResult, NoteEnhancer};
pub use error::{EnhanceError, FormErrors, GenerationError, PersistenceError, ValidationError};
pub use form::BookForm;
pub use library::{Book, NewBook};
pub use store::{BookStore, Persisted, STORAGE_KEY};
