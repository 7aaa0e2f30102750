use crate::{FormErrors, NewBook, ValidationError};

/// Raw add-book input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub total_pages: String,
}

impl BookForm {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        total_pages: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            total_pages: total_pages.into(),
        }
    }

    /// Checks every field and reports all failures together.
    pub fn validate(&self) -> Result<NewBook, FormErrors> {
        let mut errors = vec![];

        if self.title.trim().is_empty() {
            errors.push(ValidationError::EmptyTitle);
        }
        if self.author.trim().is_empty() {
            errors.push(ValidationError::EmptyAuthor);
        }

        let total_pages = match self.total_pages.trim().parse::<u32>() {
            Ok(pages) if pages > 0 => Some(pages),
            _ => {
                errors.push(ValidationError::InvalidTotalPages);
                None
            }
        };

        match total_pages {
            Some(total_pages) if errors.is_empty() => {
                NewBook::new(self.title.as_str(), self.author.as_str(), total_pages)
                    .map_err(|e| FormErrors(vec![e]))
            }
            _ => Err(FormErrors(errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_complete_input() {
        let new = BookForm::new(" The Great Gatsby ", "F. Scott Fitzgerald", "180")
            .validate()
            .unwrap();
        assert_eq!(new.title(), "The Great Gatsby");
        assert_eq!(new.author(), "F. Scott Fitzgerald");
        assert_eq!(new.total_pages(), 180);
    }

    #[test]
    fn reports_every_failing_field() {
        let errors = BookForm::default().validate().unwrap_err();
        assert_eq!(
            errors.0,
            vec![
                ValidationError::EmptyTitle,
                ValidationError::EmptyAuthor,
                ValidationError::InvalidTotalPages,
            ]
        );
    }

    #[test]
    fn rejects_non_positive_or_fractional_pages() {
        for pages in ["0", "-5", "12.5", "many"] {
            let errors = BookForm::new("Dune", "Frank Herbert", pages).validate().unwrap_err();
            assert!(errors.contains(&ValidationError::InvalidTotalPages), "{pages} accepted");
        }
    }
}
