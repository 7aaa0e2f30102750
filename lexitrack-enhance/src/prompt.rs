use lexitrack_common::EnhancementRequest;
use tera::{Context, Tera};

// Not an .html name, so tera leaves substituted text unescaped.
const TEMPLATE_NAME: &str = "enhance_notes.txt";

const TEMPLATE: &str = r#"You are an AI assistant designed to help readers engage more deeply with books.

Based on the user's notes for the book "{{ book_title }}", suggest a few insightful questions or discussion prompts that encourage deeper thinking about the text.

User Notes: {{ notes }}

Consider suggesting questions that:
* Explore the themes of the book.
* Analyze the characters' motivations.
* Discuss the author's writing style.
* Relate the book to broader social or historical contexts.
* Prompt reflection on the reader's own experiences and perspectives.

Please provide the questions or prompts in a numbered list.
"#;

/// The fixed instruction sent to the text-generation backend.
pub struct NotesPrompt {
    templates: Tera,
}

impl NotesPrompt {
    pub fn new() -> tera::Result<Self> {
        let mut templates = Tera::default();
        templates.add_raw_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { templates })
    }

    pub fn render(&self, request: &EnhancementRequest) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("book_title", request.book_title());
        context.insert("notes", request.notes());

        self.templates.render(TEMPLATE_NAME, &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_title_and_notes_verbatim() {
        let prompt = NotesPrompt::new().unwrap();
        let request = EnhancementRequest::new("Paul & <Jessica> \"{{ trust }}\"", "Dune").unwrap();

        let rendered = prompt.render(&request).unwrap();
        assert!(rendered.contains(r#"for the book "Dune""#));
        assert!(rendered.contains("User Notes: Paul & <Jessica> \"{{ trust }}\""));
    }

    #[test]
    fn asks_for_every_kind_of_question() {
        let prompt = NotesPrompt::new().unwrap();
        let rendered = prompt
            .render(&EnhancementRequest::new("She is brave.", "Dune").unwrap())
            .unwrap();

        for topic in ["themes", "motivations", "writing style", "historical contexts", "own experiences"] {
            assert!(rendered.contains(topic), "prompt lacks {topic}");
        }
    }
}
