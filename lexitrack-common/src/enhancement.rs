//! Data contracts for turning reading notes into discussion questions.
//!
//! Both types are checked once when they cross a boundary: the request when it
//! is built (or deserialized), the result when it is parsed from the backend's
//! structured output.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{EnhanceError, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEnhancementRequest")]
pub struct EnhancementRequest {
    notes: String,
    book_title: String,
}

impl EnhancementRequest {
    pub fn new(notes: impl Into<String>, book_title: impl Into<String>) -> Result<Self, ValidationError> {
        let notes = notes.into();
        if notes.is_empty() {
            return Err(ValidationError::EmptyNotes);
        }

        Ok(Self {
            notes,
            book_title: book_title.into(),
        })
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn book_title(&self) -> &str {
        &self.book_title
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnhancementRequest {
    notes: String,
    book_title: String,
}

impl TryFrom<RawEnhancementRequest> for EnhancementRequest {
    type Error = ValidationError;

    fn try_from(raw: RawEnhancementRequest) -> Result<Self, Self::Error> {
        EnhancementRequest::new(raw.notes, raw.book_title)
    }
}

impl EnhancementRequest {
    /// Validates an untyped request, as received from outside the process.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        let raw: RawEnhancementRequest = serde_json::from_value(value)
            .map_err(|e| ValidationError::MalformedRequest(e.to_string()))?;

        raw.try_into()
    }
}

/// Suggested questions, in the order the backend produced them. Unranked and
/// possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementResult {
    pub suggested_questions: Vec<String>,
}

impl EnhancementResult {
    pub fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "suggestedQuestions": {
                    "type": "array",
                    "description": "A list of insightful questions or discussion prompts based on the user notes.",
                    "items": { "type": "string" }
                }
            },
            "required": ["suggestedQuestions"],
            "additionalProperties": false
        })
    }
}

/// Anything that can turn notes into suggested questions. Implementations
/// make a single attempt and keep no state between calls.
#[async_trait]
pub trait NoteEnhancer: Send + Sync {
    async fn enhance_notes(&self, request: &EnhancementRequest) -> Result<EnhancementResult, EnhanceError>;

    /// Validates raw input first, so empty notes never reach the backend.
    async fn enhance(&self, notes: &str, book_title: &str) -> Result<EnhancementResult, EnhanceError> {
        let request = EnhancementRequest::new(notes, book_title)?;
        self.enhance_notes(&request).await
    }
}
