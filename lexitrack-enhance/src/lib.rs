//! Note enhancement: renders the discussion-question prompt for a reader's
//! notes and asks a text-generation backend for structured suggestions.

pub mod ai;
pub mod prompt;

pub use ai::{AiNoteEnhancer, ConfigError, EnhancerConfig};
pub use prompt::NotesPrompt;
