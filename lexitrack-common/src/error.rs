use std::fmt::{Display, Formatter};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Malformed user input. Recovered at the form or editor; never mutates state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Author is required")]
    EmptyAuthor,

    #[error("Total pages must be a positive number")]
    InvalidTotalPages,

    #[error("Page number must be between 0 and {total_pages}.")]
    PageOutOfRange { total_pages: u32 },

    #[error("Please write some notes first.")]
    EmptyNotes,

    #[error("Malformed enhancement request: {0}")]
    MalformedRequest(String),
}

/// Every field-level failure reported by the add-book form at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors(pub Vec<ValidationError>);

impl FormErrors {
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// Failure reading or writing the saved library. Never fatal.
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("Could not load your saved books: {0}")]
    Read(#[source] sqlx::Error),

    #[error("Could not load your saved books: stored data is corrupt ({0})")]
    Parse(#[source] serde_json::Error),

    #[error("Could not save your book changes: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Could not save your book changes: {0}")]
    Write(#[source] sqlx::Error),
}

/// Failure of the AI backend to produce suggestions.
#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    #[error("Could not render the enhancement prompt: {0}")]
    Prompt(#[source] BoxError),

    #[error("Request to the AI backend failed: {0}")]
    Transport(#[source] BoxError),

    #[error("AI backend responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI backend sent an unreadable response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("AI backend returned no structured output")]
    MissingOutput,

    #[error("AI backend output does not match the suggestion schema: {0}")]
    MalformedOutput(#[source] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum EnhanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
