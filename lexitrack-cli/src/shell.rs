//! Terminal rendering of the library: header, book cards, the detail view
//! and the suggestion panel.

use chrono::{DateTime, Datelike, Utc};
use itertools::Itertools;
use lexitrack_common::{Book, DetailEditor};

const BAR_WIDTH: usize = 20;

pub fn header() -> String {
    "LexiTrack\n=========".to_string()
}

/// One-line user-visible notification.
pub fn toast(title: &str, description: &str) -> String {
    format!("{title} {description}")
}

pub fn progress_bar(percent: f64) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;

    format!(
        "[{}{}] {}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent.round()
    )
}

/// Approximate distance between two instants, in the "3 days ago" style.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    const HOUR: i64 = 60;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;

    let seconds = (now - then).num_seconds().max(0);
    let minutes = (seconds + 30) / 60;

    let distance = if seconds < 30 {
        "less than a minute".to_string()
    } else if minutes <= 1 {
        "1 minute".to_string()
    } else if minutes < 45 {
        format!("{minutes} minutes")
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < DAY {
        format!("about {} hours", (minutes + HOUR / 2) / HOUR)
    } else if minutes < 42 * HOUR {
        "1 day".to_string()
    } else if minutes < MONTH {
        format!("{} days", (minutes + DAY / 2) / DAY)
    } else if minutes < 45 * DAY {
        "about 1 month".to_string()
    } else if minutes < 60 * DAY {
        "about 2 months".to_string()
    } else {
        let months = calendar_months_between(then, now);
        if months < 12 {
            format!("{} months", (minutes + MONTH / 2) / MONTH)
        } else {
            let years = months / 12;
            match months % 12 {
                0..=2 => format!("about {}", plural_years(years)),
                3..=8 => format!("over {}", plural_years(years)),
                _ => format!("almost {}", plural_years(years + 1)),
            }
        }
    };

    format!("{distance} ago")
}

fn plural_years(years: i64) -> String {
    match years {
        1 => "1 year".to_string(),
        n => format!("{n} years"),
    }
}

/// Whole calendar months from `then` to `now`.
fn calendar_months_between(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let months = i64::from(now.year() - then.year()) * 12 + i64::from(now.month()) - i64::from(then.month());

    let partial = (now.day(), now.time()) < (then.day(), then.time());
    if partial {
        months - 1
    } else {
        months
    }
}

pub fn book_card(book: &Book, now: DateTime<Utc>) -> String {
    [
        book.title.clone(),
        format!("  By {}", book.author),
        format!("  Added {}", relative_time(book.created_at, now)),
        format!("  Progress: {}", progress_bar(book.progress_percent())),
        format!("  Page {} of {}", book.current_page, book.total_pages),
        format!("  id: {}", book.id),
    ]
    .join("\n")
}

pub fn library_view(books: &[Book], now: DateTime<Utc>) -> String {
    if books.is_empty() {
        return format!(
            "{}\n\nYour Library is Empty\nIt looks like you haven't added any books yet. \
             Start building your reading list with `lexitrack add`.",
            header()
        );
    }

    let cards = books.iter().map(|book| book_card(book, now)).join("\n\n");
    format!("{}\n\n{}", header(), cards)
}

pub fn suggestions_panel(questions: &[String]) -> String {
    if questions.is_empty() {
        return "No questions were suggested for these notes.".to_string();
    }

    let items = questions.iter().map(|q| format!("  * {q}")).join("\n");
    format!("AI Suggested Questions:\n{items}")
}

pub fn detail_view(editor: &DetailEditor) -> String {
    let book = editor.book();
    let notes = if editor.notes().is_empty() {
        "  (no notes yet)".to_string()
    } else {
        editor.notes().lines().map(|line| format!("  {line}")).join("\n")
    };

    let mut sections = vec![
        book.title.clone(),
        format!("By {}", book.author),
        format!("Total Pages: {}", book.total_pages),
        format!("Cover: {}", book.cover_url()),
        String::new(),
        format!("Current Page: {} / {}", editor.current_page_input(), book.total_pages),
        progress_bar(book.progress_percent()),
        String::new(),
        "My Notes:".to_string(),
        notes,
    ];

    if !editor.suggestions().is_empty() {
        sections.push(String::new());
        sections.push(suggestions_panel(editor.suggestions()));
    }

    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lexitrack_common::NewBook;

    fn dune(now: DateTime<Utc>) -> Book {
        Book::from_new(NewBook::new("Dune", "Frank Herbert", 412).unwrap(), now)
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0), "[--------------------] 0%");
        assert_eq!(progress_bar(25.0), "[#####---------------] 25%");
        assert_eq!(progress_bar(100.0), "[####################] 100%");
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc::now();
        let ago = |d: Duration| relative_time(now - d, now);

        assert_eq!(ago(Duration::seconds(5)), "less than a minute ago");
        assert_eq!(ago(Duration::minutes(1)), "1 minute ago");
        assert_eq!(ago(Duration::minutes(10)), "10 minutes ago");
        assert_eq!(ago(Duration::minutes(60)), "about 1 hour ago");
        assert_eq!(ago(Duration::hours(5)), "about 5 hours ago");
        assert_eq!(ago(Duration::hours(30)), "1 day ago");
        assert_eq!(ago(Duration::days(3)), "3 days ago");
        assert_eq!(ago(Duration::days(40)), "about 1 month ago");
        assert_eq!(ago(Duration::days(200)), "7 months ago");
    }

    #[test]
    fn years_read_as_about_over_or_almost() {
        let now = "2026-10-19T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let at = |s: &str| relative_time(s.parse::<DateTime<Utc>>().unwrap(), now);

        assert_eq!(at("2025-09-01T12:00:00Z"), "about 1 year ago");
        assert_eq!(at("2025-04-19T12:00:00Z"), "over 1 year ago");
        assert_eq!(at("2024-12-01T12:00:00Z"), "almost 2 years ago");
        assert_eq!(at("2024-08-19T12:00:00Z"), "about 2 years ago");
        assert_eq!(at("2023-10-20T12:00:00Z"), "almost 3 years ago");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = Utc::now();
        assert_eq!(relative_time(now + Duration::hours(2), now), "less than a minute ago");
    }

    #[test]
    fn card_shows_progress_and_pages() {
        let now = Utc::now();
        let mut book = dune(now - Duration::days(3));
        book.current_page = 103;

        let card = book_card(&book, now);
        assert!(card.starts_with("Dune\n  By Frank Herbert"));
        assert!(card.contains("Added 3 days ago"));
        assert!(card.contains("25%"));
        assert!(card.contains("Page 103 of 412"));
    }

    #[test]
    fn empty_library_invites_adding() {
        assert!(library_view(&[], Utc::now()).contains("Your Library is Empty"));
    }

    #[test]
    fn detail_view_lists_suggestions_once_present() {
        let mut editor = DetailEditor::open(dune(Utc::now()));
        assert!(!detail_view(&editor).contains("AI Suggested Questions"));

        editor.set_notes("She is brave.");
        editor.begin_enhancement().unwrap();
        editor
            .finish_enhancement(Ok(lexitrack_common::EnhancementResult {
                suggested_questions: vec!["What is courage?".to_string()],
            }))
            .unwrap();

        let view = detail_view(&editor);
        assert!(view.contains("  She is brave."));
        assert!(view.contains("AI Suggested Questions:\n  * What is courage?"));
    }
}
