use tracing::{debug, warn};

use crate::{Book, EnhanceError, EnhancementRequest, EnhancementResult, NoteEnhancer, ValidationError};

/// Editing state for one open book: page input, notes, and the suggestions
/// panel. At most one enhancement request is in flight per editor.
#[derive(Debug, Clone)]
pub struct DetailEditor {
    book: Book,
    current_page_input: String,
    notes: String,
    suggestions: Vec<String>,
    enhancing: bool,
}

impl DetailEditor {
    pub fn open(book: Book) -> Self {
        Self {
            current_page_input: book.current_page.to_string(),
            notes: book.notes.clone(),
            suggestions: vec![],
            enhancing: false,
            book,
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn current_page_input(&self) -> &str {
        &self.current_page_input
    }

    pub fn set_current_page_input(&mut self, input: impl Into<String>) {
        self.current_page_input = input.into();
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn is_enhancing(&self) -> bool {
        self.enhancing
    }

    /// Whether the enhance action is available right now.
    pub fn can_enhance(&self) -> bool {
        !self.enhancing && !self.notes.is_empty()
    }

    /// Produces the edited book for the store. The editor's snapshot is left
    /// untouched so a rejected save changes nothing.
    pub fn save(&self) -> Result<Book, ValidationError> {
        let total_pages = self.book.total_pages;
        let out_of_range = ValidationError::PageOutOfRange { total_pages };

        let page = self
            .current_page_input
            .trim()
            .parse::<i64>()
            .map_err(|_| out_of_range.clone())?;

        if page < 0 || page > i64::from(total_pages) {
            return Err(out_of_range);
        }

        let mut updated = self.book.clone();
        updated.current_page = page as u32;
        updated.notes = self.notes.clone();
        Ok(updated)
    }

    /// Call after the store accepted a save so later edits start from it.
    pub fn saved(&mut self, book: Book) {
        self.book = book;
    }

    /// Starts an enhancement. `Ok(None)` means one is already running and this
    /// call had no effect.
    pub fn begin_enhancement(&mut self) -> Result<Option<EnhancementRequest>, ValidationError> {
        if self.enhancing {
            debug!("Enhancement already in flight for {}", self.book.id);
            return Ok(None);
        }

        let request = EnhancementRequest::new(self.notes.clone(), self.book.title.clone())?;
        self.enhancing = true;
        self.suggestions.clear();

        Ok(Some(request))
    }

    /// Ends the in-flight enhancement. Success replaces the suggestions;
    /// failure leaves the panel empty and hands the error back.
    pub fn finish_enhancement(
        &mut self,
        outcome: Result<EnhancementResult, EnhanceError>,
    ) -> Result<&[String], EnhanceError> {
        self.enhancing = false;

        match outcome {
            Ok(result) => {
                self.suggestions = result.suggested_questions;
                Ok(&self.suggestions)
            }
            Err(e) => {
                warn!("Failed to enhance notes for {}: {}", self.book.id, e);
                Err(e)
            }
        }
    }

    /// Runs one begin/finish cycle against `enhancer`. Returns `Ok(None)` when a
    /// request was already in flight.
    pub async fn enhance<E>(&mut self, enhancer: &E) -> Result<Option<&[String]>, EnhanceError>
    where
        E: NoteEnhancer + ?Sized,
    {
        let Some(request) = self.begin_enhancement()? else {
            return Ok(None);
        };

        let outcome = enhancer.enhance_notes(&request).await;
        self.finish_enhancement(outcome).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GenerationError, NewBook};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dune() -> Book {
        Book::from_new(NewBook::new("Dune", "Frank Herbert", 412).unwrap(), Utc::now())
    }

    struct Canned {
        calls: AtomicUsize,
        questions: Option<Vec<&'static str>>,
    }

    impl Canned {
        fn answering(questions: Vec<&'static str>) -> Self {
            Self { calls: AtomicUsize::new(0), questions: Some(questions) }
        }

        fn failing() -> Self {
            Self { calls: AtomicUsize::new(0), questions: None }
        }
    }

    #[async_trait]
    impl NoteEnhancer for Canned {
        async fn enhance_notes(&self, request: &EnhancementRequest) -> Result<EnhancementResult, EnhanceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(request.book_title(), "Dune");

            match &self.questions {
                Some(q) => Ok(EnhancementResult {
                    suggested_questions: q.iter().map(|s| s.to_string()).collect(),
                }),
                None => Err(GenerationError::MissingOutput.into()),
            }
        }
    }

    #[test]
    fn save_accepts_pages_within_bounds() {
        let mut editor = DetailEditor::open(dune());
        editor.set_current_page_input("412");
        editor.set_notes("Fear is the mind-killer.");

        let saved = editor.save().unwrap();
        assert_eq!(saved.current_page, 412);
        assert_eq!(saved.notes, "Fear is the mind-killer.");
        assert_eq!(saved.id, editor.book().id);
        assert_eq!(saved.title, editor.book().title);
    }

    #[test]
    fn save_rejects_out_of_range_pages() {
        for input in ["-1", "413", "ten", ""] {
            let mut editor = DetailEditor::open(dune());
            editor.set_current_page_input(input);

            assert_eq!(
                editor.save(),
                Err(ValidationError::PageOutOfRange { total_pages: 412 }),
                "{input:?} accepted"
            );
            assert_eq!(editor.book().current_page, 0);
        }
    }

    #[test]
    fn empty_notes_cannot_be_enhanced() {
        let mut editor = DetailEditor::open(dune());
        assert!(!editor.can_enhance());
        assert_eq!(editor.begin_enhancement(), Err(ValidationError::EmptyNotes));
        assert!(!editor.is_enhancing());
    }

    #[test]
    fn second_request_while_in_flight_has_no_effect() {
        let mut editor = DetailEditor::open(dune());
        editor.set_notes("She is brave.");

        let first = editor.begin_enhancement().unwrap();
        assert!(first.is_some());
        assert!(!editor.can_enhance());

        assert_eq!(editor.begin_enhancement(), Ok(None));
        assert!(editor.is_enhancing());

        let result = EnhancementResult { suggested_questions: vec!["Why?".to_string()] };
        editor.finish_enhancement(Ok(result)).unwrap();
        assert!(editor.begin_enhancement().unwrap().is_some());
    }

    #[tokio::test]
    async fn new_suggestions_replace_old_ones() {
        let mut editor = DetailEditor::open(dune());
        editor.set_notes("She is brave.");

        let first = Canned::answering(vec!["What drives Jessica?", "Is Paul a hero?"]);
        editor.enhance(&first).await.unwrap();
        assert_eq!(editor.suggestions().len(), 2);

        let second = Canned::answering(vec!["How does Herbert treat ecology?"]);
        let shown = editor.enhance(&second).await.unwrap().unwrap().to_vec();
        assert_eq!(shown, vec!["How does Herbert treat ecology?"]);
        assert_eq!(editor.suggestions(), shown.as_slice());
    }

    #[tokio::test]
    async fn failure_clears_panel_and_allows_retry() {
        let mut editor = DetailEditor::open(dune());
        editor.set_notes("She is brave.");
        editor.enhance(&Canned::answering(vec!["Old question?"])).await.unwrap();

        let failing = Canned::failing();
        let err = editor.enhance(&failing).await.unwrap_err();
        assert!(matches!(err, EnhanceError::Generation(GenerationError::MissingOutput)));
        assert!(editor.suggestions().is_empty());
        assert!(!editor.is_enhancing());
        assert!(editor.can_enhance());
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn enhancing_never_touches_the_book() {
        let book = dune();
        let mut editor = DetailEditor::open(book.clone());
        editor.set_notes("She is brave.");

        editor.enhance(&Canned::answering(vec![])).await.unwrap();
        assert_eq!(editor.book(), &book);
        assert!(editor.suggestions().is_empty());
    }
}
