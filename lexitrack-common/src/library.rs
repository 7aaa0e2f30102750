use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ValidationError;

/// Cover shown for a book that never got one assigned.
pub const DEFAULT_COVER_URL: &str = "https://placehold.co/100x150.png";

const COVER_TITLE_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub total_pages: u32,
    pub current_page: u32,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Builds a fresh book from validated form input: no progress, no notes.
    pub fn from_new(new: NewBook, created_at: DateTime<Utc>) -> Self {
        let cover_image_url = Some(placeholder_cover_url(&new.title));

        Book {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            author: new.author,
            total_pages: new.total_pages,
            current_page: 0,
            notes: String::new(),
            cover_image_url,
            created_at,
        }
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }

        f64::from(self.current_page) / f64::from(self.total_pages) * 100.0
    }

    pub fn cover_url(&self) -> &str {
        self.cover_image_url.as_deref().unwrap_or(DEFAULT_COVER_URL)
    }
}

/// Creation fields that already passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    title: String,
    author: String,
    total_pages: u32,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        total_pages: u32,
    ) -> Result<Self, ValidationError> {
        let title = title.into().trim().to_string();
        let author = author.into().trim().to_string();

        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if author.is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        if total_pages == 0 {
            return Err(ValidationError::InvalidTotalPages);
        }

        Ok(Self {
            title,
            author,
            total_pages,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }
}

fn placeholder_cover_url(title: &str) -> String {
    let label: String = title.chars().take(COVER_TITLE_CHARS).collect();
    format!(
        "https://placehold.co/150x200.png?text={}",
        urlencoding::encode(&label)
    )
}
